#![allow(dead_code)]

include!(concat!(env!("OUT_DIR"), "/installer_config.rs"));
