//! Cooling controller with temperature-based fan/pump curves.
//!
//! A controller holds the speed channels of one device. Setting a profile
//! normalizes it once and caches the curve for the channel; each temperature
//! reading is then turned into a duty by interpolation.

use std::collections::HashMap;

use log::{debug, info};

use crate::cooling::curve::{ControlPoint, NormalizedCurve, normalize_profile};
use crate::error::{LiquidError, Result};
use crate::protocol::{ProfileSupport, SpeedChannel, next_sequence};
use crate::storage::KeyValueStore;
use crate::utils::numeric::clamp;

/// Temperature source for calculating duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempSource {
    /// CPU package temperature from system sensors
    Cpu,
    /// GPU temperature from system sensors
    Gpu,
}

impl From<&str> for TempSource {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "gpu" => TempSource::Gpu,
            _ => TempSource::Cpu,
        }
    }
}

impl std::fmt::Display for TempSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TempSource::Cpu => write!(f, "CPU"),
            TempSource::Gpu => write!(f, "GPU"),
        }
    }
}

// =============================================================================
// Channel Settings
// =============================================================================

/// Values a driver has to write to apply a channel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSettings {
    /// A single duty, independent of temperature.
    Fixed(i32),
    /// Duty for each of the device's standard temperatures.
    Sampled(Vec<ControlPoint>),
    /// Exactly as many points as the device stores.
    Padded(Vec<ControlPoint>),
}

/// Settings computed for one hardware channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPlan {
    pub channel: &'static str,
    pub settings: ChannelSettings,
}

#[derive(Debug, Clone)]
enum ChannelState {
    Fixed(i32),
    Curve(NormalizedCurve),
}

// =============================================================================
// Cooling Controller
// =============================================================================

// channel modes, as the Hydro Platinum firmware numbers them
const MODE_CUSTOM_PROFILE: i64 = 0x0;
const MODE_FIXED_DUTY: i64 = 0x2;

// unconfigured channels of stateful devices run at full speed
const DEFAULT_STORED_DUTY: i32 = 100;

/// Speed-profile state of one device.
///
/// Devices that write every channel in a single message keep the
/// configuration of each channel in a [`KeyValueStore`], so that configuring
/// one channel does not reset the others.
#[derive(Debug)]
pub struct CoolingController {
    critical_temperature: i32,
    channels: Vec<SpeedChannel>,
    state: HashMap<&'static str, ChannelState>,
    store: Option<Box<dyn KeyValueStore>>,
    sequence: Option<u8>,
}

impl CoolingController {
    pub fn new(critical_temperature: i32, channels: Vec<SpeedChannel>) -> Self {
        Self {
            critical_temperature,
            channels,
            state: HashMap::new(),
            store: None,
            sequence: None,
        }
    }

    /// Keep channel configuration in `store`.
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Whether channel configuration is kept in a store.
    pub fn keeps_state(&self) -> bool {
        self.store.is_some()
    }

    /// Sequence number of the last cooling message, for stateful devices.
    pub fn sequence(&self) -> Option<u8> {
        self.sequence
    }

    /// Temperature at which every profile is forced to 100% duty.
    pub fn critical_temperature(&self) -> i32 {
        self.critical_temperature
    }

    pub fn channels(&self) -> &[SpeedChannel] {
        &self.channels
    }

    /// Whether any channel accepts a speed profile.
    pub fn supports_profiles(&self) -> bool {
        self.channels.iter().any(SpeedChannel::supports_profiles)
    }

    /// Resolve a user channel name to hardware channels.
    ///
    /// `fan` addresses every `fanN` channel when the device has no plain
    /// `fan` channel.
    pub fn resolve(&self, channel: &str) -> Result<Vec<SpeedChannel>> {
        let channel = channel.to_lowercase();
        let exact: Vec<SpeedChannel> = self
            .channels
            .iter()
            .filter(|c| c.name == channel)
            .copied()
            .collect();
        if !exact.is_empty() {
            return Ok(exact);
        }

        if channel == "fan" {
            let fans: Vec<SpeedChannel> = self
                .channels
                .iter()
                .filter(|c| {
                    c.name
                        .strip_prefix("fan")
                        .is_some_and(|n| !n.is_empty() && n.chars().all(|d| d.is_ascii_digit()))
                })
                .copied()
                .collect();
            if !fans.is_empty() {
                return Ok(fans);
            }
        }

        let mut valid: Vec<&str> = self.channels.iter().map(|c| c.name).collect();
        if self.channels.iter().any(|c| c.name.starts_with("fan")) && !valid.contains(&"fan") {
            valid.insert(0, "fan");
        }
        Err(LiquidError::UnknownChannel {
            channel,
            valid: if valid.is_empty() {
                "(none)".to_string()
            } else {
                valid.join(", ")
            },
        })
    }

    /// Set channel to follow a speed duty profile.
    ///
    /// The profile is normalized against the device's critical temperature and
    /// cached; the returned plans hold what the driver should write. Stateful
    /// devices get a plan for every channel.
    pub fn set_speed_profile(
        &mut self,
        channel: &str,
        profile: &[ControlPoint],
    ) -> Result<Vec<ChannelPlan>> {
        let targets = self.resolve(channel)?;
        let mut configured = Vec::with_capacity(targets.len());
        for target in targets {
            let (curve, settings) = self.profile_settings(target, profile)?;
            configured.push((target, curve, settings));
        }

        let mut plans = Vec::with_capacity(configured.len());
        for (target, curve, settings) in configured {
            if let Some(store) = self.store.as_mut() {
                store.store_int(&mode_key(target.name), MODE_CUSTOM_PROFILE)?;
                store.store(&profile_key(target.name), &profile.to_vec())?;
            }
            self.state.insert(target.name, ChannelState::Curve(curve));
            plans.push(ChannelPlan {
                channel: target.name,
                settings,
            });
        }

        self.finish(plans)
    }

    /// Set channel to a fixed duty.
    ///
    /// Channels that only store profiles get a flat profile up to the critical
    /// temperature, so the fail-safe still applies.
    pub fn set_fixed_speed(&mut self, channel: &str, duty: i32) -> Result<Vec<ChannelPlan>> {
        let targets = self.resolve(channel)?;
        let mut plans = Vec::with_capacity(targets.len());

        for target in targets {
            if target.supports_profiles() && !target.fixed_duty_mode {
                let flat = [
                    ControlPoint::new(0, duty),
                    ControlPoint::new(self.critical_temperature - 1, duty),
                ];
                let (curve, settings) = self.profile_settings(target, &flat)?;
                self.state.insert(target.name, ChannelState::Curve(curve));
                plans.push(ChannelPlan {
                    channel: target.name,
                    settings,
                });
                continue;
            }

            let duty = target.clamp_duty(duty);
            if let Some(store) = self.store.as_mut() {
                store.store_int(&mode_key(target.name), MODE_FIXED_DUTY)?;
                store.store_int(&duty_key(target.name), i64::from(duty))?;
            }
            info!("setting {} duty to {}%", target.name, duty);
            self.state.insert(target.name, ChannelState::Fixed(duty));
            plans.push(ChannelPlan {
                channel: target.name,
                settings: ChannelSettings::Fixed(duty),
            });
        }

        self.finish(plans)
    }

    /// The cached curve of a hardware channel, if a profile was set.
    pub fn curve(&self, channel: &str) -> Option<&NormalizedCurve> {
        match self.state.get(channel) {
            Some(ChannelState::Curve(curve)) => Some(curve),
            _ => None,
        }
    }

    /// Duty a channel runs at for temperature `temp`.
    pub fn duty_for(&self, channel: &str, temp: i32) -> Result<i32> {
        let target = self.resolve(channel)?[0];
        match self.state.get(target.name) {
            Some(ChannelState::Fixed(duty)) => Ok(*duty),
            Some(ChannelState::Curve(curve)) => Ok(target.clamp_duty(curve.interpolate(temp))),
            None => Err(LiquidError::InvalidInput(format!(
                "No speed configured for {}",
                target.name
            ))),
        }
    }

    /// Plans of the configured channels, or of every channel when the device
    /// keeps state.
    fn finish(&mut self, plans: Vec<ChannelPlan>) -> Result<Vec<ChannelPlan>> {
        if self.store.is_none() {
            return Ok(plans);
        }
        self.restore_all()
    }

    /// Rebuild every channel from the store and draw the message sequence.
    fn restore_all(&mut self) -> Result<Vec<ChannelPlan>> {
        let Some(store) = self.store.as_mut() else {
            return Ok(Vec::new());
        };

        let mut stored = Vec::with_capacity(self.channels.len());
        for target in &self.channels {
            let mode = store.load_int(&mode_key(target.name), MODE_FIXED_DUTY)?;
            let saved = if mode == MODE_CUSTOM_PROFILE && target.supports_profiles() {
                StoredChannel::Profile(store.load(&profile_key(target.name), Vec::new())?)
            } else {
                if mode != MODE_FIXED_DUTY {
                    debug!("falling back to fixed duty for {} mode {}", target.name, mode);
                }
                let duty = store.load_int(&duty_key(target.name), i64::from(DEFAULT_STORED_DUTY))?;
                StoredChannel::Fixed(clamp(duty, 0, 100) as i32)
            };
            stored.push((*target, saved));
        }
        self.sequence = Some(next_sequence(store)?);

        let mut plans = Vec::with_capacity(stored.len());
        for (target, saved) in stored {
            let settings = match saved {
                StoredChannel::Fixed(duty) => {
                    let duty = target.clamp_duty(duty);
                    info!("setting {} duty to {}%", target.name, duty);
                    self.state.insert(target.name, ChannelState::Fixed(duty));
                    ChannelSettings::Fixed(duty)
                }
                StoredChannel::Profile(points) => {
                    let (curve, settings) = self.profile_settings(target, &points)?;
                    self.state.insert(target.name, ChannelState::Curve(curve));
                    settings
                }
            };
            plans.push(ChannelPlan {
                channel: target.name,
                settings,
            });
        }
        Ok(plans)
    }

    fn profile_settings(
        &self,
        target: SpeedChannel,
        profile: &[ControlPoint],
    ) -> Result<(NormalizedCurve, ChannelSettings)> {
        match target.profile {
            ProfileSupport::FixedOnly => Err(LiquidError::InvalidInput(format!(
                "Channel {} does not support speed profiles",
                target.name
            ))),
            ProfileSupport::Sampled(temps) => {
                let curve = normalize_profile(profile, self.critical_temperature);
                let samples = temps
                    .iter()
                    .map(|&temp| {
                        let duty = target.clamp_duty(curve.interpolate(temp));
                        info!(
                            "setting {} PWM duty to {}% for temperature >= {}°C",
                            target.name, duty, temp
                        );
                        ControlPoint::new(temp, duty)
                    })
                    .collect();
                Ok((curve, ChannelSettings::Sampled(samples)))
            }
            ProfileSupport::Padded(size) => {
                let curve = self.padded_curve(profile, size)?;
                let mut padded = curve.points().to_vec();
                padded.resize(size, ControlPoint::new(self.critical_temperature, 100));
                info!("setting {} to follow profile {}", target.name, curve);
                Ok((curve, ChannelSettings::Padded(padded)))
            }
        }
    }

    fn padded_curve(&self, profile: &[ControlPoint], size: usize) -> Result<NormalizedCurve> {
        let clamped: Vec<ControlPoint> = profile
            .iter()
            .map(|p| ControlPoint::new(p.temp, clamp(p.duty, 0, 100)))
            .collect();
        let curve = normalize_profile(&clamped, self.critical_temperature);
        if curve.len() > size {
            return Err(LiquidError::InvalidProfile(format!(
                "Too many points in profile (remove {})",
                curve.len() - size
            )));
        }
        Ok(curve)
    }
}

enum StoredChannel {
    Fixed(i32),
    Profile(Vec<ControlPoint>),
}

fn mode_key(channel: &str) -> String {
    format!("{}_mode", channel)
}

fn duty_key(channel: &str) -> String {
    format!("{}_duty", channel)
}

fn profile_key(channel: &str) -> String {
    format!("{}_profile", channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::KRAKEN_X2_PROFILE_TEMPS;
    use crate::storage::{MemoryStorage, RuntimeStorage};

    fn points(pairs: &[(i32, i32)]) -> Vec<ControlPoint> {
        pairs.iter().copied().map(ControlPoint::from).collect()
    }

    fn kraken() -> CoolingController {
        CoolingController::new(
            60,
            vec![
                SpeedChannel::new("fan", 25, 100, ProfileSupport::Sampled(&KRAKEN_X2_PROFILE_TEMPS)),
                SpeedChannel::new("pump", 50, 100, ProfileSupport::Sampled(&KRAKEN_X2_PROFILE_TEMPS)),
            ],
        )
    }

    fn platinum() -> CoolingController {
        CoolingController::new(
            60,
            vec![
                SpeedChannel::new("fan1", 0, 100, ProfileSupport::Padded(7)).with_fixed_duty_mode(),
                SpeedChannel::new("fan2", 0, 100, ProfileSupport::Padded(7)).with_fixed_duty_mode(),
            ],
        )
    }

    fn scratch_dir() -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("liquid-rust-controller-{}-{}", std::process::id(), nanos))
    }

    fn psu() -> CoolingController {
        CoolingController::new(60, vec![SpeedChannel::new("fan", 0, 100, ProfileSupport::FixedOnly)])
    }

    #[test]
    fn test_sampled_profile_is_clamped_to_channel() {
        let mut kraken = kraken();
        let plans = kraken
            .set_speed_profile("pump", &points(&[(20, 30), (40, 70)]))
            .unwrap();
        assert_eq!(plans.len(), 1);
        let ChannelSettings::Sampled(samples) = &plans[0].settings else {
            panic!("expected sampled settings");
        };
        assert_eq!(samples.len(), KRAKEN_X2_PROFILE_TEMPS.len());
        assert_eq!(samples[0], ControlPoint::new(20, 50));
        assert_eq!(samples[20], ControlPoint::new(40, 70));
        assert_eq!(samples[35], ControlPoint::new(60, 100));
    }

    #[test]
    fn test_duty_for_interpolates_cached_curve() {
        let mut kraken = kraken();
        kraken
            .set_speed_profile("fan", &points(&[(20, 50), (50, 70)]))
            .unwrap();
        assert_eq!(kraken.duty_for("fan", 33).unwrap(), 59);
        assert_eq!(kraken.duty_for("fan", 55).unwrap(), 85);
        assert_eq!(kraken.duty_for("fan", 80).unwrap(), 100);
        assert_eq!(kraken.curve("fan").unwrap().last(), ControlPoint::new(60, 100));
    }

    #[test]
    fn test_duty_for_unconfigured_channel() {
        let kraken = kraken();
        assert!(matches!(
            kraken.duty_for("pump", 40),
            Err(LiquidError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unknown_channel() {
        let mut kraken = kraken();
        let err = kraken.set_fixed_speed("led", 50).unwrap_err();
        assert!(matches!(err, LiquidError::UnknownChannel { .. }));
    }

    #[test]
    fn test_fan_alias_addresses_all_fans() {
        let mut platinum = platinum();
        let plans = platinum
            .set_speed_profile("fan", &points(&[(30, 20), (40, 50)]))
            .unwrap();
        let channels: Vec<&str> = plans.iter().map(|p| p.channel).collect();
        assert_eq!(channels, vec!["fan1", "fan2"]);
        assert!(platinum.resolve("fan3").is_err());
    }

    #[test]
    fn test_padded_profile_fills_with_failsafe() {
        let mut platinum = platinum();
        let plans = platinum
            .set_speed_profile("fan1", &points(&[(30, 20), (40, 150)]))
            .unwrap();
        assert_eq!(
            plans[0].settings,
            ChannelSettings::Padded(points(&[
                (30, 20),
                (40, 100),
                (60, 100),
                (60, 100),
                (60, 100),
                (60, 100),
                (60, 100),
            ]))
        );
    }

    #[test]
    fn test_padded_profile_too_long() {
        let mut platinum = platinum();
        let profile = points(&[(20, 10), (25, 20), (30, 30), (35, 40), (40, 50), (45, 60), (50, 70)]);
        assert!(matches!(
            platinum.set_speed_profile("fan1", &profile),
            Err(LiquidError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_fixed_speed_on_profile_channel_keeps_failsafe() {
        let mut kraken = kraken();
        kraken.set_fixed_speed("fan", 40).unwrap();
        assert_eq!(kraken.duty_for("fan", 30).unwrap(), 40);
        assert_eq!(kraken.duty_for("fan", 59).unwrap(), 40);
        assert_eq!(kraken.duty_for("fan", 60).unwrap(), 100);
    }

    #[test]
    fn test_fixed_speed_on_fixed_only_channel() {
        let mut psu = psu();
        let plans = psu.set_fixed_speed("fan", 130).unwrap();
        assert_eq!(plans[0].settings, ChannelSettings::Fixed(100));
        assert_eq!(psu.duty_for("fan", 90).unwrap(), 100);
        assert!(psu.set_speed_profile("fan", &points(&[(30, 40)])).is_err());
    }

    #[test]
    fn test_fixed_speed_on_native_fixed_channel() {
        let mut platinum = platinum();
        let plans = platinum.set_fixed_speed("fan1", 40).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].settings, ChannelSettings::Fixed(40));
        assert!(platinum.curve("fan1").is_none());
        assert_eq!(platinum.duty_for("fan1", 70).unwrap(), 40);
    }

    #[test]
    fn test_stateful_device_plans_every_channel() {
        let mut platinum = platinum().with_store(Box::new(MemoryStorage::new()));
        assert!(platinum.keeps_state());
        assert_eq!(platinum.sequence(), None);

        let plans = platinum.set_fixed_speed("fan1", 40).unwrap();
        assert_eq!(
            plans,
            vec![
                ChannelPlan { channel: "fan1", settings: ChannelSettings::Fixed(40) },
                ChannelPlan { channel: "fan2", settings: ChannelSettings::Fixed(100) },
            ]
        );
        assert_eq!(platinum.sequence(), Some(1));

        let plans = platinum
            .set_speed_profile("fan2", &points(&[(30, 20), (40, 50)]))
            .unwrap();
        assert_eq!(plans[0].settings, ChannelSettings::Fixed(40));
        assert!(matches!(&plans[1].settings, ChannelSettings::Padded(p) if p.len() == 7));
        assert_eq!(platinum.sequence(), Some(2));
        assert_eq!(platinum.duty_for("fan2", 35).unwrap(), 35);
    }

    #[test]
    fn test_stateful_device_survives_reopening() {
        let dir = scratch_dir();
        let open = || {
            let store = RuntimeStorage::with_base_dirs(vec![dir.clone()], &["1b1c_0c18"]).unwrap();
            platinum().with_store(Box::new(store))
        };

        open().set_fixed_speed("fan1", 40).unwrap();
        let mut reopened = open();
        let plans = reopened
            .set_speed_profile("fan2", &points(&[(30, 20), (40, 50)]))
            .unwrap();
        assert_eq!(plans[0].settings, ChannelSettings::Fixed(40));
        assert!(matches!(plans[1].settings, ChannelSettings::Padded(_)));
        assert_eq!(reopened.sequence(), Some(2));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_stateful_device_rejects_bad_profile_without_storing() {
        let mut platinum = platinum().with_store(Box::new(MemoryStorage::new()));
        platinum.set_fixed_speed("fan", 60).unwrap();
        let profile = points(&[(20, 10), (25, 20), (30, 30), (35, 40), (40, 50), (45, 60), (50, 70)]);
        assert!(platinum.set_speed_profile("fan1", &profile).is_err());
        let plans = platinum.set_fixed_speed("fan2", 30).unwrap();
        assert_eq!(plans[0].settings, ChannelSettings::Fixed(60));
        assert_eq!(plans[1].settings, ChannelSettings::Fixed(30));
    }

    #[test]
    fn test_temp_source_from_str() {
        assert_eq!(TempSource::from("CPU"), TempSource::Cpu);
        assert_eq!(TempSource::from("gpu"), TempSource::Gpu);
        assert_eq!(TempSource::from("unknown"), TempSource::Cpu); // Default
    }
}
