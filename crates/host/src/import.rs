use crate::env::Env;
use crate::error::WasmHostError;
use fatptr_common::string;
use fatptr_common::GuestPtr;
use fatptr_common::GuestRegion;
use fatptr_common::Len;
use rand::RngCore;
use wasmer::imports;
use wasmer::AsStoreMut;
use wasmer::Function;
use wasmer::FunctionEnv;
use wasmer::FunctionEnvMut;
use wasmer::Imports;
use wasmer::RuntimeError;

/// Make a fresh random id, hex encoded.
pub fn generate_id(id_bytes: usize) -> String {
    let mut bytes = vec![0_u8; id_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hand the guest a new id.
///
/// The id is written into guest memory as a NUL terminated string, allocated by the guest's own
/// allocator so the guest can take ownership of it. The return value is the FatPtr64 of that
/// allocation with the length counting the NUL.
pub fn h_gen_id(mut function_env: FunctionEnvMut<Env>) -> Result<i64, RuntimeError> {
    let (env, mut store) = function_env.data_and_store_mut();
    let id = generate_id(env.id_bytes);
    let region = env.move_bytes_to_guest(&mut store, &string::to_nul_terminated(&id))?;
    tracing::debug!(ptr = region.ptr(), len = region.len(), %id, "h_gen_id");
    env.issued_ids.lock().push(id);
    Ok(region.to_i64())
}

/// Log a message from the guest.
/// Bytes that aren't utf-8 are logged lossily rather than rejected.
pub fn h_debug_log(
    mut function_env: FunctionEnvMut<Env>,
    guest_ptr: GuestPtr,
    len: Len,
) -> Result<(), RuntimeError> {
    let (env, store) = function_env.data_and_store_mut();
    let bytes = crate::guest::read_bytes(&store, env.memory_ref()?, GuestRegion::new(guest_ptr, len))
        .map_err(WasmHostError)?;
    let message = String::from_utf8_lossy(&bytes).into_owned();
    tracing::debug!(target: "fatptr::guest", "{}", message);
    env.debug_log.lock().push(message);
    Ok(())
}

/// Everything the host provides to guests, in the `env` module.
pub fn imports(store: &mut impl AsStoreMut, function_env: &FunctionEnv<Env>) -> Imports {
    imports! {
        "env" => {
            "h_gen_id" => Function::new_typed_with_env(store, function_env, h_gen_id),
            "h_debug_log" => Function::new_typed_with_env(store, function_env, h_debug_log),
        },
    }
}
