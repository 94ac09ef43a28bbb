mod http_processing_gateway;

pub use http_processing_gateway::HttpProcessingGateway;
