mod config_test;
mod dynamic_registry_test;
