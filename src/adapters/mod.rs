//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                     | Connects to               |
//! |-------------|--------------------------------|---------------------------|
//! | `ble`       | EventSink                      | Bluedroid GATT server     |
//! | `hardware`  | MassSensorPort, LidSensorPort  | Unit Scales (I²C), GPIO   |
//! | `log_sink`  | EventSink                      | Serial log output         |
//! | `time`      | -                              | ESP32 system timer        |
//! | `wire`      | -                              | event → tag / JSON bytes  |

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod wire;
