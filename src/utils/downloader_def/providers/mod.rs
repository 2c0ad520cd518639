pub mod direct_url;
pub mod indirect_id;
