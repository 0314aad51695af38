// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::application::delivery_mode::{DeliveryMode, DeliveryModeSelector, DeliveryPath};
use crate::application::measurement_scheduler::MeasurementScheduler;
use crate::application::messaging::LinkEventReceiver;
use crate::application::tare_controller::TareController;
use crate::config::ScaleConfig;
use crate::hmi::input_latch::{InputLatch, InputSource};
use crate::link::bthome::AdvertisementData;
use crate::link::{CharacteristicId, ConnectionHandle, LinkEvent, TelemetryLink};
use crate::weight::interface::AsyncStrainGaugeInterface;
use crate::weight::sensor_session::{SensorSession, SessionError};
use crate::weight::MeasurementReading;
use embassy_futures::select::{select3, Either3};
use embassy_time::{Instant, Timer};

/// Value returned to a GATT read of the mass characteristic when no reading could be taken.
pub const READ_ERROR_SENTINEL: i32 = i32::MIN;

/// Single consumer of everything the interrupt-like producers post: link events, button presses
/// and timer expiries. Owns the sensor session, so only one sample burst can ever be in flight.
pub struct ApplicationManager<'a, G, L> {
    config: ScaleConfig,
    session: SensorSession<G>,
    selector: DeliveryModeSelector,
    scheduler: MeasurementScheduler,
    tare: TareController,
    latch: &'a InputLatch,
    link: L,
    advertisement: AdvertisementData,
    advertising: bool,
    booted: bool,
}

impl<'a, G, GaugeE, L> ApplicationManager<'a, G, L>
where
    G: AsyncStrainGaugeInterface<Error = GaugeE>,
    L: TelemetryLink,
{
    pub fn new(config: ScaleConfig, gauge: G, link: L, latch: &'a InputLatch) -> Self {
        Self {
            session: SensorSession::new(gauge, &config),
            selector: DeliveryModeSelector::new(config.mass_characteristic),
            scheduler: MeasurementScheduler::new(&config),
            tare: TareController::new(config.tare_delay),
            latch,
            link,
            advertisement: AdvertisementData::new(config.device_name),
            advertising: false,
            booted: false,
            config,
        }
    }

    /// Gauge reset, initial tare and default scale. Leaves the amplifier powered down.
    pub async fn initialize(&mut self) -> Result<(), SessionError<GaugeE>> {
        self.session.initialize().await?;
        info!("Gauge initialised");
        self.session.tare(self.config.average_count).await?;
        info!("Initial tare done");
        self.session.set_scale(self.config.default_scale)?;
        info!("Scale set to {}", self.config.default_scale);
        Ok(())
    }

    pub fn mode(&self) -> DeliveryMode {
        self.selector.mode()
    }

    pub fn scheduler(&self) -> &MeasurementScheduler {
        &self.scheduler
    }

    pub fn tare_controller(&self) -> &TareController {
        &self.tare
    }

    pub fn session(&self) -> &SensorSession<G> {
        &self.session
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Earliest instant at which `poll_timers` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.tare.deadline(), self.scheduler.deadline()) {
            (Some(tare), Some(measurement)) => Some(tare.min(measurement)),
            (tare, measurement) => tare.or(measurement),
        }
    }

    pub async fn handle_link_event(&mut self, event: LinkEvent, now: Instant) {
        match event {
            LinkEvent::Booted { version, address } => {
                info!(
                    "Bluetooth stack booted: v{}.{}.{}-b{}",
                    version.major, version.minor, version.patch, version.build
                );
                info!("Bluetooth {:?} address: {:?}", address.kind, address.bytes);
                self.booted = true;
                // a restarted stack has dropped whatever was advertised before
                self.advertising = false;
                let mode = self.selector.boot();
                self.enter_mode(mode, now).await;
            }
            _ if !self.booted => {
                warn!("Link event before stack boot ignored: {:?}", event);
            }
            LinkEvent::ReadRequest {
                connection,
                characteristic,
            } => {
                self.answer_read_request(connection, characteristic, now).await;
            }
            _ => {
                match event {
                    LinkEvent::Connected(connection) => info!("Connection opened: {:?}", connection),
                    LinkEvent::Disconnected(connection) => info!("Connection closed: {:?}", connection),
                    LinkEvent::SubscriptionChanged {
                        characteristic,
                        config,
                    } => info!("Subscription of {:?} changed to {:?}", characteristic, config),
                    _ => {}
                }
                if let Some(mode) = self.selector.handle(&event) {
                    self.enter_mode(mode, now).await;
                }
            }
        }
    }

    /// One main-loop cycle: consume button presses, start a requested tare delay and make sure the
    /// measurement timer matches the delivery mode.
    pub async fn process(&mut self, now: Instant) {
        for source in self.latch.drain().iter() {
            match source {
                InputSource::TareButton => self.tare.request_tare(),
                InputSource::ReadButton => {
                    if let Some(reading) = self.take_reading(now).await {
                        info!("On-demand reading: {} g", reading.mass);
                    }
                }
            }
        }

        if self.tare.process(now).is_err() {
            error!("Unable to start tare delay, retrying next cycle");
        }

        if self.booted && self.scheduler.armed_path() != self.selector.mode().scheduled_path() {
            self.reconcile_scheduler(now);
        }
    }

    /// Fires whichever timers are due. A due tare runs before a due measurement.
    pub async fn poll_timers(&mut self, now: Instant) {
        if self.tare.poll(now) {
            match self.session.tare(self.config.average_count).await {
                Ok(()) => info!("Tare done"),
                Err(e) => report_session_error("Tare", &e),
            }
        }

        if let Some(path) = self.scheduler.poll(now) {
            self.deliver(path, now).await;
        }
    }

    /// Waits on link events, button presses and the earliest timer, forever.
    pub async fn run(&mut self, link_events: LinkEventReceiver<'_>) -> ! {
        let latch = self.latch;
        loop {
            let wake = select3(link_events.receive(), latch.wait(), wait_until(self.next_deadline())).await;
            let now = Instant::now();

            if let Either3::First(event) = wake {
                self.handle_link_event(event, now).await;
            }
            self.process(now).await;
            self.poll_timers(now).await;
        }
    }

    async fn enter_mode(&mut self, mode: DeliveryMode, now: Instant) {
        self.reconcile_scheduler(now);
        // the first reading of a new mode does not wait for a tick
        if let Some(path) = mode.scheduled_path() {
            self.deliver(path, now).await;
        }
    }

    fn reconcile_scheduler(&mut self, now: Instant) {
        match self.selector.mode().scheduled_path() {
            Some(path) => {
                if self.scheduler.arm(path, now).is_err() {
                    error!("Unable to arm measurement timer for {:?}, retrying next cycle", path);
                }
            }
            None => self.scheduler.disarm(),
        }
    }

    async fn deliver(&mut self, path: DeliveryPath, now: Instant) {
        let reading = self.take_reading(now).await;

        match (path, reading) {
            (DeliveryPath::Notification, Some(reading)) => {
                let payload = reading.to_le_bytes();
                if self.link.notify_all(self.config.mass_characteristic, &payload).is_err() {
                    warn!("Mass notification not sent");
                }
            }
            (DeliveryPath::Notification, None) => {}
            (DeliveryPath::Advertisement, Some(reading)) => {
                self.publish_advertisement(self.advertisement.with_mass(reading.mass));
            }
            (DeliveryPath::Advertisement, None) if !self.advertising => {
                // nothing on air, put the last known frame back (no mass object before the first reading)
                self.publish_advertisement(self.advertisement);
            }
            (DeliveryPath::Advertisement, None) => debug!("Keeping last advertisement"),
        }
    }

    fn publish_advertisement(&mut self, advertisement: AdvertisementData) {
        match advertisement.as_vec() {
            Ok(payload) => {
                if self.link.set_advertisement(&payload).is_err() {
                    warn!("Advertisement update not accepted");
                    return;
                }
                self.advertisement = advertisement;
                self.advertising = true;
            }
            Err(e) => error!("Advertisement not built: {:?}", e),
        }
    }

    async fn answer_read_request(&mut self, connection: ConnectionHandle, characteristic: CharacteristicId, now: Instant) {
        if characteristic != self.config.mass_characteristic {
            debug!("Read of {:?} is not ours", characteristic);
            return;
        }

        let value = match self.take_reading(now).await {
            Some(reading) => reading.mass_as_i32(),
            None => READ_ERROR_SENTINEL,
        };
        if self
            .link
            .send_read_response(connection, characteristic, &value.to_le_bytes())
            .is_err()
        {
            warn!("Read response not sent");
        }
    }

    async fn take_reading(&mut self, now: Instant) -> Option<MeasurementReading> {
        match self.session.read_averaged(self.config.average_count).await {
            Ok(mass) => {
                info!("mass: {} g", mass);
                Some(MeasurementReading::new(mass, now))
            }
            Err(e) => {
                report_session_error("Measurement", &e);
                None
            }
        }
    }
}

fn report_session_error<E>(operation: &str, error: &SessionError<E>) {
    match error {
        SessionError::Gauge(_) => warn!("{} failed: gauge error", operation),
        SessionError::InvalidSampleCount(n) => warn!("{} failed: invalid sample count {}", operation, n),
        SessionError::InvalidScaleFactor => warn!("{} failed: invalid scale factor", operation),
        SessionError::OutOfRange(raw) => warn!("{} failed: raw value {} at the rail", operation, raw),
        SessionError::Timeout => warn!("{} failed: sensor timed out", operation),
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => Timer::at(deadline).await,
        None => core::future::pending().await,
    }
}
