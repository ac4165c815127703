pub mod send_message_dto;
