// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn fake_clock_advances_monotonically() {
    let clock = FakeClock::new();
    let t0 = clock.epoch_ms();
    clock.advance(Duration::from_secs(30));
    assert_eq!(clock.epoch_ms(), t0 + 30_000);
}

#[test]
fn fake_clock_set_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}
