mod file_reader;
mod http_reader;
mod memory;
mod range_reader;
mod s3_reader;

pub use file_reader::FileRangeReader;
pub use http_reader::{build_url, range_header, BasicAuth, HttpRangeReader};
pub use memory::MemoryRangeReader;
pub use range_reader::RangeReader;
pub use s3_reader::{create_s3_client, S3RangeReader};
