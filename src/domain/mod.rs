// Domain layer: models for the JSON surfaces the harness consumes and the
// ports implemented by adapters and mocked in tests.

pub mod model;
pub mod ports;
