#![allow(dead_code)]

include!(concat!(env!("OUT_DIR"), "/launcher_config.rs"));
