use fatptr_guest::*;

host_externs!(h_gen_id);

#[no_mangle]
pub extern "C" fn initialize() -> i32 {
    0
}

/// Ask the host for a fresh id and make sure it arrived intact.
#[no_mangle]
pub extern "C" fn create() -> i32 {
    let region = host_region!(h_gen_id);
    match unsafe { consume_c_string(region) } {
        Ok(id) => {
            debug_log(&id);
            0
        }
        Err(_) => 1,
    }
}
