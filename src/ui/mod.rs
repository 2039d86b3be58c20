pub mod dialogs;
pub mod filter_panel;
pub mod month_grid;
pub mod task_table;
pub mod theme;
pub mod toolbar;
