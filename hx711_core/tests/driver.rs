//! Protocol and sampling-pipeline tests against the bit-level fake chip.

use hx711_core::mocks::{FakeChip, NullClock};
use hx711_core::{Error, Hx711, MovingWindow};

fn session(chip: &FakeChip) -> Hx711<
    hx711_core::mocks::FakeClockPin,
    hx711_core::mocks::FakeDataPin,
    NullClock,
> {
    let (clk, dt) = chip.pins();
    Hx711::with_clock(clk, dt, NullClock)
}

#[test]
fn read_raw_returns_queued_sample() {
    let chip = FakeChip::new();
    chip.push_sample(1234);
    let mut hx = session(&chip);
    assert_eq!(hx.read_raw().unwrap(), 1234);
}

#[test]
fn read_raw_sign_extends_negative_samples() {
    let chip = FakeChip::new();
    chip.push_samples([-8_388_608, -2]);
    let mut hx = session(&chip);
    assert_eq!(hx.read_raw().unwrap(), -8_388_608);
    assert_eq!(hx.read_raw().unwrap(), -2);
}

#[test]
fn gain_selects_end_pulse_count() {
    let chip = FakeChip::new();
    chip.push_samples([10, 20, 30]);
    let mut hx = session(&chip);
    hx.set_gain(32);
    hx.read_raw().unwrap();
    hx.read_raw().unwrap();
    hx.set_gain(64);
    hx.read_raw().unwrap();
    // Each frame's pulse count is recorded when the next ready check runs;
    // the third frame is still open here.
    assert_eq!(chip.end_pulse_log(), vec![2, 2]);
}

#[test]
fn unrecognized_gain_behaves_like_128() {
    let chip = FakeChip::new();
    chip.push_samples([10, 20]);
    let mut hx = session(&chip);
    hx.set_gain(999);
    hx.read_raw().unwrap();
    hx.read_raw().unwrap();
    assert_eq!(chip.end_pulse_log(), vec![1]);
}

#[test]
fn read_raw_times_out_when_chip_never_ready() {
    let chip = FakeChip::new();
    let mut hx = session(&chip);
    assert!(matches!(hx.read_raw(), Err(Error::Timeout)));
}

#[test]
fn gpio_failure_in_bit_loop_aborts_immediately() {
    let chip = FakeChip::new();
    chip.push_sample(500);
    // Read 1 is the ready check; read 2 is the first data bit.
    chip.fail_read_at(2);
    let mut hx = session(&chip);
    match hx.read_raw() {
        Err(Error::Gpio(cause)) => {
            assert!(cause.to_string().contains("injected"));
        }
        other => panic!("expected gpio error, got {other:?}"),
    }
}

#[test]
fn gpio_write_failure_during_reset_surfaces_cause() {
    let chip = FakeChip::new();
    chip.push_sample(1);
    chip.fail_writes(1);
    let mut hx = session(&chip);
    assert!(matches!(hx.read_median_raw(1), Err(Error::Gpio(_))));
}

#[test]
fn median_of_odd_count() {
    let chip = FakeChip::new();
    chip.push_samples([5, 1, 3]);
    let mut hx = session(&chip);
    assert_eq!(hx.read_median_raw(3).unwrap(), 3);
}

#[test]
fn median_of_even_count_takes_lower_median() {
    let chip = FakeChip::new();
    chip.push_samples([5, 1, 3, 2]);
    let mut hx = session(&chip);
    assert_eq!(hx.read_median_raw(4).unwrap(), 2);
}

#[test]
fn minus_one_artifact_is_discarded() {
    let chip = FakeChip::new();
    chip.push_samples([7, -1, 9, -1]);
    let mut hx = session(&chip);
    // Two survivors; lower median of [7, 9].
    assert_eq!(hx.read_median_raw(4).unwrap(), 7);
}

#[test]
fn all_artifacts_yield_no_sample_error() {
    let chip = FakeChip::new();
    chip.push_samples([-1, -1, -1]);
    let mut hx = session(&chip);
    match hx.read_median_raw(3) {
        Err(Error::NoSample(msg)) => assert!(msg.contains("all readings discarded")),
        other => panic!("expected NoSample, got {other:?}"),
    }
}

#[test]
fn no_sample_error_reports_last_failure() {
    let chip = FakeChip::new();
    chip.fail_all_reads(true);
    let mut hx = session(&chip);
    match hx.read_median_raw(3) {
        Err(Error::NoSample(msg)) => assert!(msg.contains("gpio error")),
        other => panic!("expected NoSample, got {other:?}"),
    }
}

#[test]
fn zero_readings_is_invalid_input() {
    let chip = FakeChip::new();
    let mut hx = session(&chip);
    assert!(matches!(hx.read_median_raw(0), Err(Error::InvalidInput(_))));
    assert!(matches!(
        hx.read_median_then_avg(3, 0),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn adjusted_median_applies_zero_and_scale() {
    let chip = FakeChip::new();
    chip.push_samples([104, 104, 104]);
    let mut hx = session(&chip);
    hx.set_adjust(100, 2.0).unwrap();
    assert_eq!(hx.read_median(3).unwrap(), 2.0);
}

#[test]
fn median_then_avg_means_the_medians() {
    let chip = FakeChip::new();
    chip.push_samples([10, 20, 30, 40, 50, 60]);
    let mut hx = session(&chip);
    assert_eq!(hx.read_median_then_avg(3, 2).unwrap(), 35.0);
}

#[test]
fn median_then_avg_aborts_on_any_failure() {
    let chip = FakeChip::new();
    // Enough for the first median only; the second round times out.
    chip.push_samples([10, 20, 30]);
    let mut hx = session(&chip);
    assert!(hx.read_median_then_avg(3, 2).is_err());
}

#[test]
fn moving_avg_threads_caller_owned_window() {
    let chip = FakeChip::new();
    chip.push_samples([10, 20, 30]);
    let mut hx = session(&chip);
    let mut window = MovingWindow::new(2);
    assert_eq!(hx.read_median_then_moving_avg(1, &mut window).unwrap(), 10.0);
    assert_eq!(hx.read_median_then_moving_avg(1, &mut window).unwrap(), 15.0);
    assert_eq!(hx.read_median_then_moving_avg(1, &mut window).unwrap(), 25.0);
    assert_eq!(window.len(), 2);
}

#[test]
fn into_pins_releases_the_handles() {
    let chip = FakeChip::new();
    chip.push_sample(42);
    let mut hx = session(&chip);
    assert_eq!(hx.read_raw().unwrap(), 42);
    let (_clk, _dt) = hx.into_pins();
}
