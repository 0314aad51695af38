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

use crate::config::ScaleConfig;
use crate::weight::interface::AsyncStrainGaugeInterface;
use embassy_time::{with_timeout, Duration, Timer};
use heapless::Vec;
use micromath::statistics::Mean;

/// Upper bound on the samples averaged in one burst.
pub const MAX_SAMPLE_COUNT: usize = 32;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError<GaugeE> {
    Gauge(GaugeE),
    InvalidSampleCount(usize),
    InvalidScaleFactor,
    /// A conversion sat on the ADC rail.
    OutOfRange(i32),
    /// The burst did not complete within the acquisition timeout.
    Timeout,
}

/// Owns the amplifier's power rail and calibration. Every burst runs power up, settle, sample and
/// power down as one call, so the amplifier is only powered while a caller is inside this type.
pub struct SensorSession<G> {
    gauge: G,
    powered: bool,
    scale_factor: f32,
    zero_offset: f32,
    settle_time: Duration,
    acquisition_timeout: Duration,
}

impl<G, GaugeE> SensorSession<G>
where
    G: AsyncStrainGaugeInterface<Error = GaugeE>,
{
    pub fn new(gauge: G, config: &ScaleConfig) -> Self {
        Self {
            gauge,
            powered: false,
            scale_factor: config.default_scale,
            zero_offset: 0.0,
            settle_time: config.settle_time,
            acquisition_timeout: config.acquisition_timeout,
        }
    }

    /// Runs the gauge's reset sequence and leaves it powered down.
    pub async fn initialize(&mut self) -> Result<(), SessionError<GaugeE>> {
        self.powered = true;
        let init = self.gauge.initialize().await.map_err(SessionError::Gauge);
        let shutdown = self.power_down().await;
        init?;
        shutdown
    }

    pub fn gauge(&self) -> &G {
        &self.gauge
    }

    pub fn gauge_mut(&mut self) -> &mut G {
        &mut self.gauge
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn zero_offset(&self) -> f32 {
        self.zero_offset
    }

    /// Raw counts per unit of mass.
    pub fn set_scale(&mut self, factor: f32) -> Result<(), SessionError<GaugeE>> {
        if !factor.is_finite() || factor == 0.0 {
            return Err(SessionError::InvalidScaleFactor);
        }
        self.scale_factor = factor;
        Ok(())
    }

    pub async fn read_averaged(&mut self, sample_count: usize) -> Result<f32, SessionError<GaugeE>> {
        let raw_mean = self.powered_mean(sample_count).await?;
        let mass = (raw_mean - self.zero_offset) / self.scale_factor;
        trace!("Raw mean = {}, mass = {}", raw_mean, mass);
        Ok(mass)
    }

    /// Takes the current load as zero. The scale factor is left alone.
    pub async fn tare(&mut self, sample_count: usize) -> Result<(), SessionError<GaugeE>> {
        self.zero_offset = self.powered_mean(sample_count).await?;
        trace!("Tare offset = {}", self.zero_offset);
        Ok(())
    }

    /// Derives the scale factor from a known mass on the platter. Tare first.
    pub async fn calibrate(&mut self, known_mass: f32, sample_count: usize) -> Result<f32, SessionError<GaugeE>> {
        if !known_mass.is_finite() || known_mass == 0.0 {
            return Err(SessionError::InvalidScaleFactor);
        }
        let tared_mean = self.powered_mean(sample_count).await? - self.zero_offset;
        self.set_scale(tared_mean / known_mass)?;
        trace!("Calibration counts per unit = {}", self.scale_factor);
        Ok(self.scale_factor)
    }

    async fn powered_mean(&mut self, sample_count: usize) -> Result<f32, SessionError<GaugeE>> {
        if sample_count == 0 || sample_count > MAX_SAMPLE_COUNT {
            return Err(SessionError::InvalidSampleCount(sample_count));
        }

        let burst = match with_timeout(self.acquisition_timeout, self.acquire(sample_count)).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout),
        };
        // power down regardless of how the burst ended
        let shutdown = self.power_down().await;

        let mean = burst?;
        shutdown?;
        Ok(mean)
    }

    async fn acquire(&mut self, sample_count: usize) -> Result<f32, SessionError<GaugeE>> {
        self.powered = true;
        self.gauge.power_up().await.map_err(SessionError::Gauge)?;
        Timer::after(self.settle_time).await;

        let rail = rail_magnitude(self.gauge.get_adc_bit_count());
        let mut samples = Vec::<f32, MAX_SAMPLE_COUNT>::new();

        for _ in 0..sample_count {
            let raw = self.gauge.get_next_reading().await.map_err(SessionError::Gauge)?;
            if i64::from(raw) >= rail - 1 || i64::from(raw) <= -rail {
                return Err(SessionError::OutOfRange(raw));
            }
            samples
                .push(raw as f32)
                .map_err(|_| SessionError::InvalidSampleCount(sample_count))?;
        }

        Ok(samples.into_iter().mean())
    }

    async fn power_down(&mut self) -> Result<(), SessionError<GaugeE>> {
        self.gauge.power_down().await.map_err(SessionError::Gauge)?;
        self.powered = false;
        Ok(())
    }
}

/// Magnitude of the negative rail of a two's-complement ADC. Widths outside 1..=32 are clamped
/// to the `i32` a conversion is carried in.
fn rail_magnitude(adc_bits: usize) -> i64 {
    1i64 << (adc_bits.clamp(1, 32) - 1)
}
