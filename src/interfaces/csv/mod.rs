pub mod report_writer;
pub mod shipment_reader;
pub mod transaction_reader;
