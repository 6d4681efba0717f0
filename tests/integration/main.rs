mod e2e_test;
mod feed_test;
mod server_test;
