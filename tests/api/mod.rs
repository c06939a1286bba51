mod http_tests;
mod websocket_tests;
