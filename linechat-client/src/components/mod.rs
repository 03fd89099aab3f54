pub(crate) mod chat_history;
pub(crate) mod text_input;
