pub mod wasms;

#[cfg(test)]
pub mod tests {
    use crate::wasms::TestWasm;
    use fatptr_host::prelude::*;

    #[ctor::ctor]
    fn before() {
        env_logger::init();
    }

    fn error(result: Result<i32, RuntimeError>) -> WasmErrorInner {
        result.unwrap_err().downcast::<WasmError>().unwrap().error
    }

    #[test]
    fn initialize_returns_zero() {
        assert_eq!(0, TestWasm::Token.instance().initialize().unwrap());
    }

    #[test]
    fn create_receives_an_id() {
        let mut contract = TestWasm::Token.instance();
        assert_eq!(0, contract.create().unwrap());

        let issued_ids = contract.issued_ids();
        assert_eq!(1, issued_ids.len());
        assert_eq!(64, issued_ids[0].len());
        // the guest logs the id it decoded out of the fat pointer
        assert_eq!(issued_ids, contract.debug_log());
    }

    #[test]
    fn every_create_gets_a_fresh_id() {
        let mut contract = TestWasm::Token.instance();
        for _ in 0..3 {
            assert_eq!(0, contract.create().unwrap());
        }
        let mut issued_ids = contract.issued_ids();
        issued_ids.dedup();
        assert_eq!(3, issued_ids.len());
    }

    #[test]
    fn id_len_counts_the_nul() {
        let mut contract =
            TestWasm::Io.instance_with_config(&HostConfig::default().with_id_bytes(5));
        assert_eq!(11, contract.call_entry_point("id_len").unwrap());
    }

    #[test]
    fn empty_ids() {
        let mut contract =
            TestWasm::Io.instance_with_config(&HostConfig::default().with_id_bytes(0));
        assert_eq!(1, contract.call_entry_point("id_len").unwrap());
        assert_eq!(0, contract.call_entry_point("id_echo").unwrap());
        assert_eq!(vec![String::new()], contract.debug_log());
    }

    #[test]
    fn id_echo() {
        let mut contract = TestWasm::Io.instance();
        assert_eq!(0, contract.call_entry_point("id_echo").unwrap());
        assert_eq!(contract.issued_ids(), contract.debug_log());
    }

    #[test]
    fn id_pair() {
        let mut contract = TestWasm::Io.instance();
        assert_eq!(0, contract.call_entry_point("id_pair").unwrap());
        assert_eq!(2, contract.issued_ids().len());
        assert_eq!(contract.issued_ids(), contract.debug_log());
    }

    #[test]
    fn guest_rejects_regions_outside_its_memory() {
        let mut contract = TestWasm::Io.instance();
        assert_eq!(1, contract.call_entry_point("bad_region").unwrap());
    }

    #[test]
    fn host_rejects_regions_outside_guest_memory() {
        let mut contract = TestWasm::Io.instance();
        assert!(matches!(
            error(contract.call_entry_point("bad_log")),
            WasmErrorInner::OutOfBounds {
                ptr: 0xFFFF_FFFB,
                len: 16,
                ..
            }
        ));
        assert!(contract.debug_log().is_empty());
    }

    #[test]
    fn spin_runs_out_of_gas() {
        let mut contract =
            TestWasm::Io.instance_with_config(&HostConfig::default().with_metering_limit(1_000_000));
        assert_eq!(
            WasmErrorInner::OutOfGas,
            error(contract.call_entry_point("spin"))
        );
        assert_eq!(None, contract.remaining_points());
    }

    #[test]
    fn metering_resets_per_call() {
        let config = HostConfig::default().with_metering_limit(1_000_000);
        let mut contract = TestWasm::Token.instance_with_config(&config);
        for _ in 0..5 {
            contract.create().unwrap();
            let remaining = contract.remaining_points().unwrap();
            assert!(remaining < config.metering_limit);
            // a single create is nowhere near the limit, so nothing carried over
            assert!(remaining > config.metering_limit / 2);
        }
    }

    #[test]
    fn empty_wasm_has_no_entry_points() {
        let mut contract = TestWasm::Empty.instance();
        assert!(matches!(
            error(contract.initialize()),
            WasmErrorInner::Export(_)
        ));
        assert!(matches!(error(contract.create()), WasmErrorInner::Export(_)));
    }

    #[test]
    fn modules_are_cached() {
        TestWasm::Token.instance();
        TestWasm::Token.instance();
        assert!(TestWasm::module_cache()
            .cache
            .write()
            .get_item(&TestWasm::Token.key())
            .is_some());
    }

    #[test]
    fn modules_survive_in_the_filesystem_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = HostConfig::default().with_cache_dir(dir.path());
        let wasm = TestWasm::Token;

        let cache = ModuleCache::from_config(&config);
        let mut contract =
            ContractInstance::from_cache(&cache, wasm.key(), wasm.bytes(), &config).unwrap();
        assert_eq!(0, contract.create().unwrap());

        // a new cache has nothing in memory and no wasm to compile
        let cache = ModuleCache::from_config(&config);
        let mut contract = ContractInstance::from_cache(&cache, wasm.key(), &[], &config).unwrap();
        assert_eq!(0, contract.create().unwrap());
    }
}
