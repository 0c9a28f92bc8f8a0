mod catalog_test;
mod cli_test;
mod config_test;
mod dataset_test;
mod workspace_test;
