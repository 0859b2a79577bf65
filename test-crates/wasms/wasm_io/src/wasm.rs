use fatptr_guest::*;

host_externs!(h_gen_id);

/// Length of a fresh id as the guest sees it, NUL included.
#[no_mangle]
pub extern "C" fn id_len() -> i32 {
    let region = h_gen_id_region();
    let len = region.len() as i32;
    match unsafe { consume_bytes(region) } {
        Ok(_) => len,
        Err(_) => -1,
    }
}

/// Borrow a fresh id in place and log it back to the host.
#[no_mangle]
pub extern "C" fn id_echo() -> i32 {
    let region = h_gen_id_region();
    let bytes = match unsafe { region_bytes(region) } {
        Ok(bytes) => bytes,
        Err(_) => return 1,
    };
    match string::from_nul_terminated(bytes) {
        Ok(id) => {
            debug_log(&id);
            0
        }
        Err(_) => 2,
    }
}

/// Both halves of a 128 bit fat pointer built from two ids.
#[no_mangle]
pub extern "C" fn id_pair() -> i32 {
    let first = h_gen_id_region();
    let second = h_gen_id_region();
    let encoded = encode128(first.ptr(), first.len(), second.ptr(), second.len());
    let [a, b]: [GuestRegion; 2] = decode128(encoded).into();
    for region in [a, b] {
        match unsafe { consume_c_string(region) } {
            Ok(id) => debug_log(&id),
            Err(_) => return 1,
        }
    }
    0
}

/// A region the guest doesn't have.
#[no_mangle]
pub extern "C" fn bad_region() -> i32 {
    let region = GuestRegion::new(u32::MAX - 4, 16);
    match unsafe { region_bytes(region) } {
        Ok(_) => 0,
        Err(e) => match e.error {
            WasmErrorInner::OutOfBounds { .. } => 1,
            _ => 2,
        },
    }
}

/// Ask the host to log a region the guest doesn't have.
#[no_mangle]
pub extern "C" fn bad_log() -> i32 {
    unsafe { raw_debug_log(u32::MAX - 4, 16) };
    0
}

#[no_mangle]
pub extern "C" fn spin() -> i32 {
    let mut i: i32 = 0;
    loop {
        i = core::hint::black_box(i.wrapping_add(1));
        if i == 0 {
            debug_log("wrapped");
        }
    }
}

extern "C" {
    #[link_name = "h_debug_log"]
    fn raw_debug_log(ptr: GuestPtr, len: Len);
}
