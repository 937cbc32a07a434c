#![allow(dead_code, non_upper_case_globals)]

include!(concat!(env!("OUT_DIR"), "/bindgen.rs"));
