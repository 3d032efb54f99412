use std::cell::{Cell, Ref, RefCell};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::device::{AudioDevice, AudioParam, DeviceState, GainNode, OscillatorNode, Timer};
use crate::envelope::{Automation, ParamEvent};
use crate::error::DeviceError;
use crate::input::KeySurface;
use crate::note::Note;
use crate::params::Waveform;

type Clock = Rc<Cell<f64>>;

#[derive(Clone)]
pub struct MockParam {
    automation: Rc<RefCell<Automation>>,
    clock: Clock,
}

impl MockParam {
    pub fn new(initial: f32) -> Self {
        Self::with_clock(initial, Rc::new(Cell::new(0.0)))
    }

    fn with_clock(initial: f32, clock: Clock) -> Self {
        Self {
            automation: Rc::new(RefCell::new(Automation::new(initial))),
            clock,
        }
    }

    pub fn automation(&self) -> Ref<'_, Automation> {
        self.automation.borrow()
    }

    pub fn value_at(&self, t: f64) -> f32 {
        self.automation.borrow().value_at(t)
    }
}

impl AudioParam for MockParam {
    fn value(&self) -> f32 {
        self.value_at(self.clock.get())
    }

    fn set_value(&self, value: f32) -> Result<(), DeviceError> {
        self.automation.borrow_mut().set_initial(value);
        Ok(())
    }

    fn set_value_at_time(&self, value: f32, time: f64) -> Result<(), DeviceError> {
        self.automation
            .borrow_mut()
            .push(ParamEvent::SetValue { value, time });
        Ok(())
    }

    fn linear_ramp_to_value_at_time(&self, value: f32, time: f64) -> Result<(), DeviceError> {
        self.automation
            .borrow_mut()
            .push(ParamEvent::LinearRamp { value, time });
        Ok(())
    }

    fn exponential_ramp_to_value_at_time(
        &self,
        value: f32,
        time: f64,
    ) -> Result<(), DeviceError> {
        if value <= 0.0 {
            return Err(DeviceError::new("RangeError: target must be positive"));
        }
        self.automation
            .borrow_mut()
            .push(ParamEvent::ExponentialRamp { value, time });
        Ok(())
    }

    fn cancel_scheduled_values(&self, from: f64) -> Result<(), DeviceError> {
        self.automation.borrow_mut().push(ParamEvent::Cancel { from });
        Ok(())
    }
}

struct OscillatorState {
    waveform: Cell<Waveform>,
    frequency: MockParam,
    detune: MockParam,
    started: Cell<bool>,
    stop_calls: Cell<u32>,
    output: Cell<Option<usize>>,
    fail_stop: Cell<bool>,
}

#[derive(Clone)]
pub struct MockOscillator(Rc<OscillatorState>);

impl MockOscillator {
    pub fn waveform(&self) -> Waveform {
        self.0.waveform.get()
    }

    pub fn frequency_hz(&self) -> f32 {
        self.0.frequency.automation().value_at(0.0)
    }

    pub fn detune_cents(&self) -> f32 {
        self.0.detune.automation().value_at(0.0)
    }

    pub fn is_started(&self) -> bool {
        self.0.started.get()
    }

    pub fn is_stopped(&self) -> bool {
        self.0.stop_calls.get() > 0
    }

    pub fn stop_calls(&self) -> u32 {
        self.0.stop_calls.get()
    }

    /// Gain node id this oscillator feeds.
    pub fn output(&self) -> Option<usize> {
        self.0.output.get()
    }

    pub fn fail_stop(&self) {
        self.0.fail_stop.set(true);
    }
}

impl OscillatorNode for MockOscillator {
    type Param = MockParam;

    fn set_waveform(&self, waveform: Waveform) {
        self.0.waveform.set(waveform);
    }

    fn frequency(&self) -> MockParam {
        self.0.frequency.clone()
    }

    fn detune(&self) -> MockParam {
        self.0.detune.clone()
    }

    fn start(&self) -> Result<(), DeviceError> {
        if self.0.started.replace(true) {
            return Err(DeviceError::new("InvalidStateError: already started"));
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), DeviceError> {
        if self.0.fail_stop.get() {
            return Err(DeviceError::new("InvalidStateError: cannot stop"));
        }
        self.0.stop_calls.set(self.0.stop_calls.get() + 1);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), DeviceError> {
        self.0.output.set(None);
        Ok(())
    }
}

struct GainState {
    id: usize,
    gain: MockParam,
    disconnected: Cell<bool>,
    output: Cell<Option<usize>>,
    to_destination: Cell<bool>,
    events_at_connect: Cell<Option<usize>>,
}

#[derive(Clone)]
pub struct MockGain(Rc<GainState>);

impl MockGain {
    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn gain_param(&self) -> &MockParam {
        &self.0.gain
    }

    pub fn is_disconnected(&self) -> bool {
        self.0.disconnected.get()
    }

    pub fn output(&self) -> Option<usize> {
        self.0.output.get()
    }

    pub fn is_connected_to_destination(&self) -> bool {
        self.0.to_destination.get()
    }

    /// Gain events already scheduled when this node reached the destination.
    pub fn events_at_connect(&self) -> Option<usize> {
        self.0.events_at_connect.get()
    }
}

impl GainNode for MockGain {
    type Param = MockParam;

    fn gain(&self) -> MockParam {
        self.0.gain.clone()
    }

    fn disconnect(&self) -> Result<(), DeviceError> {
        self.0.disconnected.set(true);
        self.0.to_destination.set(false);
        Ok(())
    }
}

#[derive(Default)]
struct Graph {
    clock: Clock,
    suspended: Cell<bool>,
    resumes: Cell<u32>,
    fail_resume: Cell<bool>,
    slow_resume: Cell<bool>,
    fail_oscillators: Cell<bool>,
    fail_destination: Cell<bool>,
    next_id: Cell<usize>,
    oscillators: RefCell<Vec<MockOscillator>>,
    gains: RefCell<Vec<MockGain>>,
}

impl Graph {
    fn next_id(&self) -> usize {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// Records every node and connection; starts suspended like a browser
/// context created before any user gesture. Clones share the graph, so a
/// test keeps one and inspects what the engine built.
#[derive(Clone)]
pub struct MockDevice(Rc<Graph>);

impl MockDevice {
    pub fn new() -> Self {
        let graph = Graph::default();
        graph.suspended.set(true);
        Self(Rc::new(graph))
    }

    pub fn running() -> Self {
        Self(Rc::new(Graph::default()))
    }

    pub fn resume_count(&self) -> u32 {
        self.0.resumes.get()
    }

    pub fn fail_resume(&self) {
        self.0.fail_resume.set(true);
    }

    /// Make `resume` stay pending for one poll, like a real context does.
    pub fn slow_resume(&self) {
        self.0.slow_resume.set(true);
    }

    pub fn fail_oscillators(&self, fail: bool) {
        self.0.fail_oscillators.set(fail);
    }

    pub fn fail_destination(&self, fail: bool) {
        self.0.fail_destination.set(fail);
    }

    pub fn advance(&self, secs: f64) {
        self.0.clock.set(self.0.clock.get() + secs);
    }

    pub fn oscillators(&self) -> Vec<MockOscillator> {
        self.0.oscillators.borrow().clone()
    }

    pub fn gains(&self) -> Vec<MockGain> {
        self.0.gains.borrow().clone()
    }

    /// Oscillators feeding, through their own gain stage, into `output`.
    pub fn oscillators_into(&self, output: &MockGain) -> Vec<MockOscillator> {
        let stages: HashSet<usize> = self
            .gains()
            .iter()
            .filter(|g| g.output() == Some(output.id()))
            .map(|g| g.id())
            .collect();
        self.oscillators()
            .into_iter()
            .filter(|o| o.output().is_some_and(|id| stages.contains(&id)))
            .collect()
    }

    /// Gains currently wired to the destination.
    pub fn audible_outputs(&self) -> Vec<MockGain> {
        self.gains()
            .into_iter()
            .filter(|g| g.is_connected_to_destination())
            .collect()
    }
}

impl AudioDevice for MockDevice {
    type Oscillator = MockOscillator;
    type Gain = MockGain;

    fn state(&self) -> DeviceState {
        if self.0.suspended.get() {
            DeviceState::Suspended
        } else {
            DeviceState::Running
        }
    }

    async fn resume(&self) -> Result<(), DeviceError> {
        self.0.resumes.set(self.0.resumes.get() + 1);
        if self.0.slow_resume.get() {
            YieldOnce(false).await;
        }
        if self.0.fail_resume.get() {
            return Err(DeviceError::new("resume rejected"));
        }
        self.0.suspended.set(false);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.0.clock.get()
    }

    fn create_oscillator(&self) -> Result<MockOscillator, DeviceError> {
        if self.0.fail_oscillators.get() {
            return Err(DeviceError::new("NotSupportedError: oscillator"));
        }
        let osc = MockOscillator(Rc::new(OscillatorState {
            waveform: Cell::new(Waveform::Sine),
            frequency: MockParam::with_clock(440.0, self.0.clock.clone()),
            detune: MockParam::with_clock(0.0, self.0.clock.clone()),
            started: Cell::new(false),
            stop_calls: Cell::new(0),
            output: Cell::new(None),
            fail_stop: Cell::new(false),
        }));
        self.0.oscillators.borrow_mut().push(osc.clone());
        Ok(osc)
    }

    fn create_gain(&self) -> Result<MockGain, DeviceError> {
        let gain = MockGain(Rc::new(GainState {
            id: self.0.next_id(),
            gain: MockParam::with_clock(1.0, self.0.clock.clone()),
            disconnected: Cell::new(false),
            output: Cell::new(None),
            to_destination: Cell::new(false),
            events_at_connect: Cell::new(None),
        }));
        self.0.gains.borrow_mut().push(gain.clone());
        Ok(gain)
    }

    fn connect_oscillator(&self, from: &MockOscillator, to: &MockGain) -> Result<(), DeviceError> {
        from.0.output.set(Some(to.id()));
        Ok(())
    }

    fn connect_gain(&self, from: &MockGain, to: &MockGain) -> Result<(), DeviceError> {
        from.0.output.set(Some(to.id()));
        Ok(())
    }

    fn connect_to_destination(&self, from: &MockGain) -> Result<(), DeviceError> {
        if self.0.fail_destination.get() {
            return Err(DeviceError::new("InvalidAccessError: destination"));
        }
        from.0
            .events_at_connect
            .set(Some(from.0.gain.automation().events().len()));
        from.0.to_destination.set(true);
        Ok(())
    }
}

struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

type Task = (f64, Box<dyn FnOnce()>);

/// Timer driven by the test: tasks run when the shared clock passes their
/// due time.
#[derive(Clone)]
pub struct ManualTimer {
    clock: Clock,
    tasks: Rc<RefCell<Vec<Task>>>,
}

impl ManualTimer {
    /// A timer sharing `device`'s clock.
    pub fn for_device(device: &MockDevice) -> Self {
        Self {
            clock: device.0.clock.clone(),
            tasks: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Move the clock forward and run every task that became due, in due
    /// order.
    pub fn advance(&self, secs: f64) {
        self.clock.set(self.clock.get() + secs);
        let now = self.clock.get();
        let mut due: Vec<Task> = {
            let mut tasks = self.tasks.borrow_mut();
            let (ready, waiting): (Vec<Task>, Vec<Task>) =
                tasks.drain(..).partition(|(at, _)| *at <= now);
            *tasks = waiting;
            ready
        };
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, task) in due {
            task();
        }
    }
}

impl Timer for ManualTimer {
    fn defer(&self, delay_secs: f64, task: Box<dyn FnOnce()>) {
        let at = self.clock.get() + delay_secs;
        self.tasks.borrow_mut().push((at, task));
    }
}

/// Records the active flag of each key.
#[derive(Clone, Default)]
pub struct MockSurface {
    active: Rc<RefCell<HashSet<Note>>>,
}

impl MockSurface {
    pub fn is_active(&self, note: Note) -> bool {
        self.active.borrow().contains(&note)
    }
}

impl KeySurface for MockSurface {
    fn set_active(&self, note: Note, active: bool) {
        let mut set = self.active.borrow_mut();
        if active {
            set.insert(note);
        } else {
            set.remove(&note);
        }
    }
}
