//! AMD GPU provider using amdgpu sysfs
//!
//! Source units: `temp*_input` in millidegrees Celsius, `gpu_busy_percent` and
//! `mem_busy_percent` in percent, `power1_average` / `power1_input` in
//! microwatts (reported as watts), and
//! `pp_dpm_sclk` / `pp_dpm_mclk` levels in MHz.

use super::backend::{check_clock, check_percent};
use anyhow::{bail, Context, Result};
use gpuwatch_core::{DeviceProvider, GpuSample, ProviderMode, ReadError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Default location of DRM cards
pub const DRM_ROOT: &str = "/sys/class/drm";

const AMD_VENDOR_ID: u32 = 0x1002;

/// DRM card indices probed at bind time
const MAX_CARDS: u32 = 16;

/// One amdgpu card
#[derive(Debug, Clone)]
struct AmdCard {
    name: String,
    device_path: PathBuf,
    hwmon_path: Option<PathBuf>,
}

impl AmdCard {
    fn probe(root: &Path, card_index: u32) -> Result<Self> {
        let device_path = root.join(format!("card{}", card_index)).join("device");

        if !device_path.exists() {
            bail!("card{} not found", card_index);
        }

        // Verify it's an AMD GPU by checking vendor
        let vendor_id = read_hex_file(&device_path.join("vendor"))?;
        if vendor_id != AMD_VENDOR_ID {
            bail!("card{} is not an AMD GPU (vendor ID: 0x{:04x})", card_index, vendor_id);
        }

        let name = read_hex_file(&device_path.join("device"))
            .ok()
            .and_then(gpu_name)
            .unwrap_or_else(|| format!("AMD GPU card{}", card_index));
        let hwmon_path = find_hwmon_path(&device_path)?;

        Ok(Self {
            name,
            device_path,
            hwmon_path,
        })
    }
}

/// amdgpu sysfs provider
pub struct SysfsProvider {
    cards: Vec<AmdCard>,
    epoch: Instant,
}

impl SysfsProvider {
    /// Enumerate AMD cards under `root`; GPU indices follow card order
    pub fn with_root(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("{} not found", root.display());
        }

        let mut cards = Vec::new();
        for card_index in 0..MAX_CARDS {
            match AmdCard::probe(root, card_index) {
                Ok(card) => {
                    log::info!("  [{}] {} (card{})", cards.len(), card.name, card_index);
                    cards.push(card);
                }
                Err(e) => {
                    // Not all card indices will be AMD GPUs
                    log::trace!("  Skipping: {:#}", e);
                }
            }
        }

        Ok(Self {
            cards,
            epoch: Instant::now(),
        })
    }

    /// Names of the bound cards, in GPU index order
    pub fn card_names(&self) -> Vec<&str> {
        self.cards.iter().map(|card| card.name.as_str()).collect()
    }

    fn card(&self, index: u32) -> Result<&AmdCard, ReadError> {
        self.cards
            .get(index as usize)
            .ok_or_else(|| ReadError::query(index, "device", "no such GPU"))
    }

    fn read_temperature(&self, index: u32, card: &AmdCard) -> Result<i32, ReadError> {
        let hwmon = hwmon(index, card)?;

        // Try different temperature input files
        for temp_file in ["temp1_input", "temp2_input", "temp3_input"] {
            if let Ok(millidegrees) = read_int_file(&hwmon.join(temp_file)) {
                return i32::try_from((millidegrees + 500).div_euclid(1000))
                    .map_err(|_| ReadError::sentinel(index, "temperature", millidegrees));
            }
        }
        Err(ReadError::query(index, "temperature", "no temp*_input sensor"))
    }

    fn read_power(&self, index: u32, card: &AmdCard) -> Result<f64, ReadError> {
        let hwmon = hwmon(index, card)?;

        // Try different power input files
        for power_file in ["power1_average", "power1_input"] {
            if let Ok(microwatts) = read_int_file(&hwmon.join(power_file)) {
                if microwatts < 0 {
                    return Err(ReadError::sentinel(index, "power", microwatts));
                }
                return Ok(microwatts as f64 / 1_000_000.0);
            }
        }
        Err(ReadError::query(index, "power", "no power1 sensor"))
    }

    fn read_clock(&self, index: u32, card: &AmdCard, file: &'static str) -> Result<u32, ReadError> {
        let content = fs::read_to_string(card.device_path.join(file))
            .map_err(|e| ReadError::query(index, file, e))?;
        let mhz = parse_active_clock(&content)
            .ok_or_else(|| ReadError::sentinel(index, file, content.trim()))?;
        check_clock(index, file, i64::from(mhz))
    }
}

impl DeviceProvider for SysfsProvider {
    fn mode(&self) -> ProviderMode {
        ProviderMode::AmdLinux
    }

    fn count(&self) -> u32 {
        self.cards.len() as u32
    }

    fn sample(&self, index: u32) -> Result<GpuSample, ReadError> {
        let card = self.card(index)?;
        let busy = read_field(index, "gpu_busy_percent", &card.device_path)?;
        // Memory controller activity, the same quantity NVML reports
        let mem_busy = read_field(index, "mem_busy_percent", &card.device_path)?;

        Ok(GpuSample {
            gpu_index: index,
            temperature: self.read_temperature(index, card)?,
            gpu_utilization: check_percent(index, "gpu_busy_percent", busy)?,
            memory_utilization: check_percent(index, "mem_busy_percent", mem_busy)?,
            power_usage: self.read_power(index, card)?,
            gpu_clock: self.read_clock(index, card, "pp_dpm_sclk")?,
            memory_clock: self.read_clock(index, card, "pp_dpm_mclk")?,
            timestamp: self.epoch.elapsed(),
        })
    }
}

fn hwmon(index: u32, card: &AmdCard) -> Result<&Path, ReadError> {
    card.hwmon_path
        .as_deref()
        .ok_or_else(|| ReadError::query(index, "hwmon", "no hwmon directory"))
}

fn read_field(index: u32, field: &'static str, dir: &Path) -> Result<i64, ReadError> {
    read_int_file(&dir.join(field)).map_err(|e| ReadError::query(index, field, format!("{:#}", e)))
}

/// Read a hexadecimal value from a sysfs file
fn read_hex_file(path: &Path) -> Result<u32> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let trimmed = content.trim().trim_start_matches("0x");
    u32::from_str_radix(trimmed, 16)
        .with_context(|| format!("Failed to parse hex value from {}", path.display()))
}

/// Read an integer value from a sysfs file
fn read_int_file(path: &Path) -> Result<i64> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    content
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Failed to parse integer from {}", path.display()))
}

/// Find the hwmon directory for this GPU
fn find_hwmon_path(device_path: &Path) -> Result<Option<PathBuf>> {
    let hwmon_dir = device_path.join("hwmon");
    if !hwmon_dir.exists() {
        return Ok(None);
    }

    for entry in fs::read_dir(&hwmon_dir)? {
        let path = entry?.path();
        let is_hwmon = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.starts_with("hwmon"));
        if path.is_dir() && is_hwmon {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Extract the active level from a `pp_dpm_*` table.
///
/// Format: `"0: 300Mhz\n1: 1200Mhz *\n"` where `*` marks the active level.
fn parse_active_clock(content: &str) -> Option<u32> {
    let line = content.lines().find(|line| line.contains('*'))?;
    let level = line.split(':').nth(1)?;
    let digits = level
        .trim()
        .trim_end_matches('*')
        .trim()
        .to_ascii_lowercase();
    digits.trim_end_matches("mhz").trim().parse().ok()
}

/// Human-readable name for a few common device IDs
fn gpu_name(device_id: u32) -> Option<String> {
    let name = match device_id {
        0x67DF => "RX 480/470",
        0x687F => "Vega 56/64",
        0x731F => "RX 5700 XT",
        0x73BF => "RX 6900 XT",
        0x73DF => "RX 6700 XT",
        0x744C => "RX 7900 XT/XTX",
        _ => return None,
    };
    Some(format!("AMD Radeon {}", name))
}
