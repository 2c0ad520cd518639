pub mod downloader;
pub mod errors;
pub mod providers;
pub mod provisioner;
pub mod r#trait;

#[cfg(test)]
mod test_server;
