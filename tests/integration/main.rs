mod common;

mod commands_test;
mod schema_client_test;
