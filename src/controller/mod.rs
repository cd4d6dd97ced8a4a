pub mod settings;
pub mod task_list;
