//! A device abstraction for the shift-register Nixie display and the one task that drives it.
//!
//! The display task is the only code that touches the register bus. Everything else (the
//! hourly timer, the motion sensor, the control surface) talks to it through a [`Nixie`]
//! handle, which queues [`EffectCommand`]s and updates the shared display preferences.
//!
//! See [`Nixie`] for usage.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use core::sync::atomic::{AtomicBool, Ordering};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_time::{Duration, TimeoutError, with_timeout};
use oorandom::Rand32;

use crate::clock::{ONE_SECOND, TimeSource};
use crate::effects::{SlotMachine, steady_time_frame};
use crate::frame::Frame;
use crate::shift_register::FrameBus;
use crate::time_format::{TimeFormat, TimeFormatCell};

/// Commands that can wait in the display queue at once. Further commands are dropped.
pub const COMMAND_QUEUE_CAPACITY: usize = 5;

/// How long the display task waits for a command before refreshing the time anyway.
pub const HEARTBEAT: Duration = ONE_SECOND;

/// What the display task should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectCommand {
    /// Render the current time once.
    ShowTime,
    /// Play the slot-machine roll to completion.
    SlotMachine,
}

/// What the display task is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    #[default]
    Idle,
    RenderingTime,
    RenderingEffect,
}

/// Channel type for display commands.
type EffectCommands = Channel<CriticalSectionRawMutex, EffectCommand, COMMAND_QUEUE_CAPACITY>;

/// Resources shared between the display task and its [`Nixie`] handles.
pub struct NixieStatic {
    commands: EffectCommands,
    format: TimeFormatCell,
    separator_enabled: AtomicBool,
}

/// Handle to the display task.
///
/// Cheap to copy; give one to every producer. All methods return immediately.
///
/// # Example
///
/// Board build only (`--features pico1`).
///
/// ```ignore
/// use embassy_executor::Spawner;
/// use embassy_rp::gpio::{Level, Output};
/// use embassy_time::Delay;
/// use nixie_clock::clock::WallClock;
/// use nixie_clock::nixie::{Nixie, NixieStatic};
/// use nixie_clock::shift_register::{BusTiming, ShiftRegisterBus};
/// use nixie_clock::time_format::TimeFormat;
///
/// async fn example(p: embassy_rp::Peripherals, spawner: Spawner) -> nixie_clock::Result<()> {
///     static CLOCK: WallClock = WallClock::new();
///     static NIXIE_STATIC: NixieStatic = Nixie::new_static();
///
///     let bus = ShiftRegisterBus::new(
///         Output::new(p.PIN_4, Level::Low), // data
///         Output::new(p.PIN_6, Level::Low), // shift clock
///         Output::new(p.PIN_5, Level::Low), // latch
///         Delay,
///         BusTiming::default(),
///     );
///     let nixie = Nixie::new(&NIXIE_STATIC, bus, &CLOCK, 0x5eed, spawner)?;
///
///     nixie.set_format(TimeFormat::Twelve);
///     nixie.slot_machine();
///     Ok(())
/// }
/// ```
#[derive(Clone, Copy)]
pub struct Nixie<'a> {
    commands: &'a EffectCommands,
    format: &'a TimeFormatCell,
    separator_enabled: &'a AtomicBool,
}

impl<'a> Nixie<'a> {
    /// Create [`Nixie`] resources. 24-hour format with blinking separators.
    #[must_use]
    pub const fn new_static() -> NixieStatic {
        NixieStatic {
            commands: Channel::new(),
            format: TimeFormatCell::new(TimeFormat::TwentyFour),
            separator_enabled: AtomicBool::new(true),
        }
    }

    /// A handle onto existing resources, for when the display task is run by the caller.
    #[must_use]
    pub const fn from_static(nixie_static: &'a NixieStatic) -> Self {
        Self {
            commands: &nixie_static.commands,
            format: &nixie_static.format,
            separator_enabled: &nixie_static.separator_enabled,
        }
    }

    /// Queue a command for the display task.
    ///
    /// Never blocks. If the queue is full the command is dropped; the time display recovers
    /// on the next heartbeat regardless.
    pub fn enqueue(&self, command: EffectCommand) {
        match self.commands.try_send(command) {
            Ok(()) => trace!("Display command queued: {:?}", command),
            Err(TrySendError::Full(command)) => {
                warn!("Display queue full; dropping {:?}", command);
            }
        }
    }

    /// Queue an immediate time refresh.
    pub fn show_time(&self) {
        self.enqueue(EffectCommand::ShowTime);
    }

    /// Queue a slot-machine roll.
    pub fn slot_machine(&self) {
        self.enqueue(EffectCommand::SlotMachine);
    }

    /// Number of commands waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.commands.len()
    }

    /// Switch between 12- and 24-hour display. Takes effect on the next render.
    pub fn set_format(&self, format: TimeFormat) {
        self.format.set(format);
        info!("Format updated: {:?}", format);
    }

    #[must_use]
    pub fn format(&self) -> TimeFormat {
        self.format.get()
    }

    /// Let the separators blink with the seconds, or keep them dark.
    pub fn set_separator_enabled(&self, enabled: bool) {
        self.separator_enabled.store(enabled, Ordering::Relaxed);
        info!("Separator blinking: {}", enabled);
    }

    #[must_use]
    pub fn separator_enabled(&self) -> bool {
        self.separator_enabled.load(Ordering::Relaxed)
    }
}

/// Timing knobs for [`DisplayScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerTiming {
    /// Longest wait for a command before the time is refreshed unprompted.
    pub heartbeat: Duration,
    pub slot_machine: SlotMachine,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            heartbeat: HEARTBEAT,
            slot_machine: SlotMachine::default(),
        }
    }
}

/// The display task: sole owner of the bus.
///
/// Waits up to one heartbeat for a command, renders what it asks for (or the time, if none
/// came), and repeats. Renders never overlap because there is only this one caller of
/// [`FrameBus::transmit`], and it awaits each render to completion.
pub struct DisplayScheduler<'a, B, C> {
    commands: &'a EffectCommands,
    format: &'a TimeFormatCell,
    separator_enabled: &'a AtomicBool,
    bus: B,
    clock: C,
    rng: Rand32,
    timing: SchedulerTiming,
    state: SchedulerState,
}

impl<'a, B, C> DisplayScheduler<'a, B, C>
where
    B: FrameBus,
    C: TimeSource,
{
    /// Takes ownership of `bus`. `seed` seeds the slot-machine digits.
    pub fn new(
        nixie_static: &'a NixieStatic,
        bus: B,
        clock: C,
        seed: u64,
        timing: SchedulerTiming,
    ) -> Self {
        Self {
            commands: &nixie_static.commands,
            format: &nixie_static.format,
            separator_enabled: &nixie_static.separator_enabled,
            bus,
            clock,
            rng: Rand32::new(seed),
            timing,
            state: SchedulerState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Blank the display, then serve commands forever.
    pub async fn run(mut self) -> ! {
        info!(
            "Display task started (heartbeat: {} ms)",
            self.timing.heartbeat.as_millis()
        );
        self.blank().await;
        loop {
            self.step().await;
        }
    }

    /// Wait for one command (or the heartbeat timeout) and render accordingly.
    pub async fn step(&mut self) {
        match with_timeout(self.timing.heartbeat, self.commands.receive()).await {
            Ok(EffectCommand::SlotMachine) => self.render_slot_machine().await,
            Ok(EffectCommand::ShowTime) | Err(TimeoutError) => self.render_time().await,
        }
    }

    /// Show an all-dark frame.
    pub async fn blank(&mut self) {
        self.bus.transmit(Frame::BLANK).await;
    }

    async fn render_time(&mut self) {
        self.state = SchedulerState::RenderingTime;
        let sample = self.clock.now();
        let frame = steady_time_frame(
            sample,
            self.format.get(),
            self.separator_enabled.load(Ordering::Relaxed),
        );
        trace!(
            "Time {}:{}:{}",
            sample.hours,
            sample.minutes,
            sample.seconds
        );
        self.bus.transmit(frame).await;
        self.state = SchedulerState::Idle;
    }

    async fn render_slot_machine(&mut self) {
        self.state = SchedulerState::RenderingEffect;
        info!("Slot machine effect started");
        self.timing
            .slot_machine
            .run(&mut self.bus, &mut self.rng)
            .await;
        info!("Slot machine effect complete");
        self.render_time().await;
    }
}

#[cfg(feature = "pico1")]
mod board {
    use embassy_executor::Spawner;

    use super::{DisplayScheduler, Nixie, NixieStatic, SchedulerTiming};
    use crate::Result;
    use crate::clock::WallClock;
    use crate::hardware::BoardBus;

    type BoardScheduler = DisplayScheduler<'static, BoardBus, &'static WallClock>;

    impl Nixie<'static> {
        /// Creates the display task on its own executor slot and returns a handle to it.
        ///
        /// # Errors
        ///
        /// Returns an error if the task cannot be spawned.
        #[must_use = "Must be used to manage the spawned task"]
        pub fn new(
            nixie_static: &'static NixieStatic,
            bus: BoardBus,
            clock: &'static WallClock,
            seed: u64,
            spawner: Spawner,
        ) -> Result<Self> {
            let scheduler =
                DisplayScheduler::new(nixie_static, bus, clock, seed, SchedulerTiming::default());
            spawner.spawn(nixie_device_loop(scheduler))?;
            Ok(Self::from_static(nixie_static))
        }
    }

    #[embassy_executor::task]
    async fn nixie_device_loop(scheduler: BoardScheduler) -> ! {
        scheduler.run().await
    }
}
