#![no_main]

use libfuzzer_sys::fuzz_target;
use signalphase::cli::console::{OperatorCommand, parse_command};
use signalphase::input::RequestedDurations;
use signalphase::phase::SignalController;

// Feeds each line to the parser and drives a controller with the result,
// ticking after every line. The phase table must never be left.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut controller = SignalController::new();
    let mut fields = RequestedDurations::default();
    for line in text.lines().take(256) {
        match parse_command(line) {
            Ok(Some(OperatorCommand::Start)) => {
                controller.start(fields);
            }
            Ok(Some(OperatorCommand::Stop)) => {
                controller.stop();
            }
            Ok(Some(OperatorCommand::Reset)) => controller.reset(),
            Ok(Some(OperatorCommand::Set(requested))) => {
                fields = requested;
                controller.set_durations(requested.resolve());
            }
            _ => {}
        }
        controller.tick();
        assert!(controller.current_phase().index() < 8);
        assert!(controller.state().applied.green() > 0);
    }
});
