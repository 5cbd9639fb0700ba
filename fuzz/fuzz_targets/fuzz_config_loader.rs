#![no_main]

use libfuzzer_sys::fuzz_target;
use signalphase::config::ConfigLoader;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        let loader = ConfigLoader::with_defaults();
        if let Ok(loaded) = loader.load_from_str(yaml) {
            // A config that loads must yield a usable tick period.
            assert!(loaded.config.tick_interval().is_ok());
        }
    }
});
