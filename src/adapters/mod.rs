//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements         | Connects to              |
//! |-----------------|--------------------|--------------------------|
//! | `hardware`      | SensorPort         | ESP32 ADC, GPIO          |
//! |                 | ActuatorPort       | Fan / relay GPIO         |
//! | `log_sink`      | EventSink          | Serial log output        |
//! | `static_config` | ConfigPort         | Compiled-in JSON         |
//! | `time`          | TimePort           | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod static_config;
pub mod time;
