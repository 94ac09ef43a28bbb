mod http_processing_gateway_test;
mod support;
