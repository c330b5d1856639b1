pub mod history_io;
pub mod paths;
pub mod settings_io;
pub mod storage;
