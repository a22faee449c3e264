//! Host-level tests for the display task, driven by the std time driver.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;

use embassy_futures::select::{Either, select};
use embassy_futures::{block_on, join::join};
use embassy_time::{Duration, Instant, Timer};
use nixie_clock::clock::{TimeSample, TimeSource};
use nixie_clock::effects::{SlotMachine, steady_time_frame};
use nixie_clock::frame::DigitSlot;
use nixie_clock::nixie::{COMMAND_QUEUE_CAPACITY, EffectCommand, SchedulerState, SchedulerTiming};
use nixie_clock::shift_register::FrameBus;
use nixie_clock::time_format::TimeFormat;
use nixie_clock::{DisplayScheduler, Frame, Nixie, NixieStatic};

// An even second, so time frames always carry the separator and slot frames never do.
const NOW: TimeSample = TimeSample::new(13, 45, 20);
const SLOT_FRAMES: u16 = 6;

struct FixedClock(TimeSample);

impl TimeSource for FixedClock {
    fn now(&self) -> TimeSample {
        self.0
    }
}

/// Records frames and fails if a transmit starts while another is still in progress.
#[derive(Clone, Default)]
struct RecordingBus {
    frames: Rc<RefCell<Vec<Frame>>>,
    in_flight: Rc<Cell<bool>>,
}

impl FrameBus for RecordingBus {
    async fn transmit(&mut self, frame: Frame) {
        assert!(!self.in_flight.replace(true), "overlapping transmit");
        Timer::after(Duration::from_micros(50)).await;
        self.frames.borrow_mut().push(frame);
        self.in_flight.set(false);
    }
}

/// Same as [`RecordingBus`] but shareable with the assertions of a multi-threaded test.
#[derive(Clone, Default)]
struct SharedBus {
    frames: Arc<Mutex<Vec<Frame>>>,
    in_flight: Arc<Mutex<bool>>,
}

impl FrameBus for SharedBus {
    async fn transmit(&mut self, frame: Frame) {
        {
            let mut in_flight = self.in_flight.lock().expect("not poisoned");
            assert!(!*in_flight, "overlapping transmit");
            *in_flight = true;
        }
        Timer::after(Duration::from_micros(50)).await;
        self.frames.lock().expect("not poisoned").push(frame);
        *self.in_flight.lock().expect("not poisoned") = false;
    }
}

fn fast_timing(heartbeat_ms: u64) -> SchedulerTiming {
    SchedulerTiming {
        heartbeat: Duration::from_millis(heartbeat_ms),
        slot_machine: SlotMachine {
            frames: SLOT_FRAMES,
            frame_delay: Duration::from_millis(1),
        },
    }
}

fn scheduler<'a>(
    nixie_static: &'a NixieStatic,
    bus: &RecordingBus,
    timing: SchedulerTiming,
) -> DisplayScheduler<'a, RecordingBus, FixedClock> {
    DisplayScheduler::new(nixie_static, bus.clone(), FixedClock(NOW), 7, timing)
}

fn time_frame() -> Frame {
    steady_time_frame(NOW, TimeFormat::TwentyFour, true)
}

fn is_slot_frame(frame: Frame) -> bool {
    !frame.separator() && DigitSlot::ALL.iter().all(|&slot| frame.digit(slot).is_some())
}

#[test]
fn heartbeat_renders_time_without_commands() {
    let nixie_static = Nixie::new_static();
    let bus = RecordingBus::default();
    let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(20));

    let start = Instant::now();
    block_on(scheduler.step());

    assert!(start.elapsed() >= Duration::from_millis(20));
    assert_eq!(*bus.frames.borrow(), [time_frame()]);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn show_time_renders_before_heartbeat() {
    let nixie_static = Nixie::new_static();
    let nixie = Nixie::from_static(&nixie_static);
    let bus = RecordingBus::default();
    let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(10_000));

    nixie.show_time();
    let start = Instant::now();
    block_on(scheduler.step());

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(*bus.frames.borrow(), [time_frame()]);
}

#[test]
fn format_and_separator_changes_apply_on_next_render() {
    let nixie_static = Nixie::new_static();
    let nixie = Nixie::from_static(&nixie_static);
    let bus = RecordingBus::default();
    let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(10_000));

    nixie.set_format(TimeFormat::Twelve);
    nixie.set_separator_enabled(false);
    nixie.show_time();
    block_on(scheduler.step());

    let frame = bus.frames.borrow()[0];
    assert_eq!(frame.digit(DigitSlot::HourTens), Some(0));
    assert_eq!(frame.digit(DigitSlot::HourUnits), Some(1));
    assert!(!frame.separator());
    assert_eq!(nixie.format(), TimeFormat::Twelve);
    assert!(!nixie.separator_enabled());
}

#[test]
fn slot_machine_plays_every_frame_then_returns_to_idle() {
    let nixie_static = Nixie::new_static();
    let nixie = Nixie::from_static(&nixie_static);
    let bus = RecordingBus::default();
    let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(10_000));

    nixie.slot_machine();
    block_on(scheduler.step());

    let frames = bus.frames.borrow();
    let slot_frames = usize::from(SLOT_FRAMES);
    assert_eq!(frames.len(), slot_frames + 1);
    assert!(frames[..slot_frames].iter().all(|&frame| is_slot_frame(frame)));
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn time_is_restored_as_soon_as_the_roll_ends() {
    let nixie_static = Nixie::new_static();
    let nixie = Nixie::from_static(&nixie_static);
    let bus = RecordingBus::default();
    let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(10_000));

    nixie.slot_machine();
    let start = Instant::now();
    block_on(scheduler.step());

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(bus.frames.borrow().last(), Some(&time_frame()));
}

#[test]
fn same_seed_rolls_same_digits() {
    let roll = || {
        let nixie_static = Nixie::new_static();
        let bus = RecordingBus::default();
        let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(10_000));
        Nixie::from_static(&nixie_static).slot_machine();
        block_on(scheduler.step());
        bus.frames.take()
    };
    assert_eq!(roll(), roll());
}

#[test]
fn commands_sent_during_effect_wait_for_it_to_finish() {
    let nixie_static = Nixie::new_static();
    let nixie = Nixie::from_static(&nixie_static);
    let bus = RecordingBus::default();
    let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(10_000));

    nixie.slot_machine();
    block_on(join(scheduler.step(), async {
        Timer::after(Duration::from_millis(2)).await;
        nixie.show_time();
    }));

    assert_eq!(bus.frames.borrow().len(), usize::from(SLOT_FRAMES) + 1);
    assert_eq!(nixie.pending(), 1);

    block_on(scheduler.step());
    assert_eq!(bus.frames.borrow().last(), Some(&time_frame()));
    assert_eq!(nixie.pending(), 0);
}

#[test]
fn full_queue_drops_newest_and_serves_in_order() {
    let nixie_static = Nixie::new_static();
    let nixie = Nixie::from_static(&nixie_static);
    let bus = RecordingBus::default();
    let mut scheduler = scheduler(&nixie_static, &bus, fast_timing(10_000));

    nixie.show_time();
    nixie.slot_machine();
    for _ in 0..COMMAND_QUEUE_CAPACITY {
        nixie.enqueue(EffectCommand::ShowTime);
    }
    assert_eq!(nixie.pending(), COMMAND_QUEUE_CAPACITY);

    block_on(async {
        for _ in 0..COMMAND_QUEUE_CAPACITY {
            scheduler.step().await;
        }
    });

    let frames = bus.frames.borrow();
    let slot_frames = usize::from(SLOT_FRAMES);
    // The roll ends with its own time frame.
    assert_eq!(frames.len(), 1 + slot_frames + 1 + (COMMAND_QUEUE_CAPACITY - 2));
    assert_eq!(frames[0], time_frame());
    assert!(frames[1..=slot_frames].iter().all(|&frame| is_slot_frame(frame)));
    assert!(frames[1 + slot_frames..].iter().all(|&frame| frame == time_frame()));
    assert_eq!(nixie.pending(), 0);
}

#[test]
fn run_blanks_first_then_keeps_time_on_screen() {
    let nixie_static = Nixie::new_static();
    let bus = RecordingBus::default();
    let scheduler = scheduler(&nixie_static, &bus, fast_timing(5));

    let outcome = block_on(select(
        scheduler.run(),
        Timer::after(Duration::from_millis(60)),
    ));
    assert!(matches!(outcome, Either::Second(())));

    let frames = bus.frames.borrow();
    assert_eq!(frames.first(), Some(&Frame::BLANK));
    assert!(frames.len() >= 2);
    assert!(frames[1..].iter().all(|&frame| frame == time_frame()));
}

#[test]
fn producers_on_other_threads_never_overlap_renders() {
    static NIXIE_STATIC: NixieStatic = Nixie::new_static();
    const PRODUCERS: usize = 4;
    const COMMANDS_EACH: usize = 10;

    let bus = SharedBus::default();
    let scheduler = DisplayScheduler::new(
        &NIXIE_STATIC,
        bus.clone(),
        FixedClock(NOW),
        11,
        fast_timing(3),
    );

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|index| {
            thread::spawn(move || {
                let nixie = Nixie::from_static(&NIXIE_STATIC);
                for round in 0..COMMANDS_EACH {
                    if (index + round) % 3 == 0 {
                        nixie.slot_machine();
                    } else {
                        nixie.show_time();
                    }
                    thread::sleep(std::time::Duration::from_millis(2));
                }
            })
        })
        .collect();

    let _ = block_on(select(
        scheduler.run(),
        Timer::after(Duration::from_millis(400)),
    ));
    for producer in producers {
        producer.join().expect("producer thread panicked");
    }

    let frames = bus.frames.lock().expect("not poisoned").clone();
    assert_eq!(frames.first(), Some(&Frame::BLANK));

    // Every complete run of slot frames is a whole number of rolls.
    let mut run = 0_usize;
    for &frame in &frames[1..] {
        if frame == time_frame() {
            assert_eq!(run % usize::from(SLOT_FRAMES), 0, "roll interrupted");
            run = 0;
        } else {
            assert!(is_slot_frame(frame));
            run += 1;
        }
    }
}
