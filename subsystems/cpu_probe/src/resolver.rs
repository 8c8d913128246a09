//! # Topology and Frequency Resolver
//!
//! Runs the whole probe once: identification, TSC calibration, ratio and
//! topology decoding for the processor generation, link speed, and the
//! final defaults.
//!
//! Irregular register values never fail the probe. They fall back to a
//! 100 MHz bus clock, a core clock equal to the TSC, and the Core 2
//! device class. Only a platform that reports a register as unreadable
//! makes [`resolve`] return an error.

use log::debug;
use quartz_hal::cpuid::bitfield32;
use quartz_hal::msr::{CoreThreadCount, FlexRatio, PerfStatus, PlatformInfo, TurboRatioLimit};
use quartz_hal::{CpuidReg, HalResult, Platform};

use crate::brand::Brand;
use crate::calibrate::calibrate_tsc;
use crate::config::{ProbeConfig, TraceFlags};
use crate::device_class::CpuType;
use crate::ident::{CachedLeaf, CpuVendor, CpuidCache, Signature};
use crate::info::{PlatformCpuInfo, TurboRatios};
use crate::link::probe_link_speed;
use crate::model;
use crate::ratio::Ratio;

/// Bus clock assumed when no ratio could be resolved
pub const DEFAULT_FSB_FREQUENCY: u64 = 100_000_000;

/// Output of a decoding strategy
#[derive(Debug, Default)]
struct Decoded {
    cores: u32,
    threads: u32,
    fsb: u64,
    cpu: u64,
    qpi: u64,
    max: Ratio,
    current: Ratio,
    cpu_type: Option<CpuType>,
    turbo: Option<TurboRatios>,
}

/// Probe the boot processor
pub fn resolve<P: Platform + ?Sized>(platform: &mut P, config: &ProbeConfig) -> HalResult<PlatformCpuInfo> {
    let cpuid = CpuidCache::read(platform);
    let id = Signature::decode(&cpuid);
    let brand = Brand::read(platform, &cpuid).unwrap_or_default();
    let features = cpuid.feature_mask();

    let tsc = calibrate_tsc(platform, &config.calibration);
    debug!("CPU: TSC {tsc} Hz");

    let strategy = match id.cpu_vendor() {
        CpuVendor::Intel => model::strategy_for(id.family, id.model),
        _ => None,
    };
    debug!(
        "CPU: family {:#x} model {:#x}, strategy {:?}",
        id.family, id.model, strategy
    );

    let mut decoded = match strategy {
        None => Decoded::default(),
        Some(strategy) => match strategy.core_count_hi_bit() {
            Some(hi_bit) => decode_core_thread_count(platform, hi_bit, tsc, brand.as_str(), config.trace)?,
            None => decode_perf_status(platform, &cpuid, &id, tsc)?,
        },
    };

    if decoded.fsb == 0 {
        debug!("CPU: no bus ratio, assuming {} MHz FSB", DEFAULT_FSB_FREQUENCY / 1_000_000);
        decoded.fsb = DEFAULT_FSB_FREQUENCY;
        decoded.cpu = tsc;
    }

    let cpu_type = decoded
        .cpu_type
        .unwrap_or_default()
        .refine(decoded.cores, decoded.threads);
    let cores = decoded.cores.max(1);
    let threads = decoded.threads.max(cores);

    let info = PlatformCpuInfo {
        id,
        brand: brand.text,
        mobile: brand.mobile,
        features,
        cpuid,
        cores,
        threads,
        tsc_frequency: tsc,
        fsb_frequency: decoded.fsb,
        cpu_frequency: decoded.cpu,
        qpi_speed: decoded.qpi,
        max_ratio: decoded.max,
        current_ratio: decoded.current,
        cpu_type,
        turbo: decoded.turbo,
    };

    if config.trace.contains(TraceFlags::DEBUG_DUMP) {
        debug!("\n{info}");
    }

    Ok(info)
}

/// Nehalem and later: MSR_CORE_THREAD_COUNT topology, MSR_PLATFORM_INFO
/// ratio, QPI link speed
fn decode_core_thread_count<P: Platform + ?Sized>(
    platform: &mut P,
    hi_bit: u32,
    tsc: u64,
    brand: &str,
    trace: TraceFlags,
) -> HalResult<Decoded> {
    let count = CoreThreadCount::from_raw(platform.read_msr(CoreThreadCount::ADDRESS)?);
    let cores = count.cores(hi_bit);
    let threads = count.threads();

    // Diagnostic only, a missing register just leaves the table out
    let turbo = if trace.contains(TraceFlags::TURBO_RATIOS) {
        platform
            .read_msr(TurboRatioLimit::ADDRESS)
            .ok()
            .map(|raw| TurboRatios::decode(TurboRatioLimit::from_raw(raw), cores))
    } else {
        None
    };

    let info = PlatformInfo::from_raw(platform.read_msr(PlatformInfo::ADDRESS)?);
    let flex = FlexRatio::from_raw(platform.read_msr(FlexRatio::ADDRESS)?);
    let nominal = info.max_non_turbo_ratio();
    let current = Ratio::whole(flex.clamp(nominal));
    if current.coef != nominal {
        debug!("CPU: flex ratio {} overrides {nominal}", current.coef);
    }

    let fsb = current.bus_from(tsc).unwrap_or(0);
    let qpi = probe_link_speed(platform, fsb)?;

    Ok(Decoded {
        cores,
        threads,
        fsb,
        cpu: tsc,
        qpi,
        max: Ratio::default(),
        current,
        cpu_type: Some(CpuType::from_brand(brand)),
        turbo,
    })
}

/// Core 2 and NetBurst: CPUID topology, IA32_PERF_STATUS ratios
fn decode_perf_status<P: Platform + ?Sized>(
    platform: &mut P,
    cpuid: &CpuidCache,
    id: &Signature,
    tsc: u64,
) -> HalResult<Decoded> {
    let threads = bitfield32(cpuid.get(CachedLeaf::Leaf1, CpuidReg::Ebx), 23, 16);
    let cores = bitfield32(cpuid.get(CachedLeaf::Leaf4, CpuidReg::Eax), 31, 26) + 1;

    let status = PerfStatus::from_raw(platform.read_msr(PerfStatus::ADDRESS)?);
    let current = Ratio::new(status.current_ratio(), status.current_half_step());
    let max_coef = if model::reports_max_ratio(id.family, id.model) {
        status.max_ratio()
    } else {
        current.coef
    };
    let max = Ratio::new(max_coef, status.max_half_step());
    debug!("CPU: max ratio {max}, current ratio {current}");

    let (fsb, cpu) = match max.bus_from(tsc) {
        Some(fsb) => (fsb, current.core_from(fsb)),
        None => (0, 0),
    };

    Ok(Decoded {
        cores,
        threads,
        fsb,
        cpu,
        qpi: 0,
        max,
        current,
        cpu_type: None,
        turbo: None,
    })
}

#[cfg(test)]
mod tests {
    use quartz_hal::mock::{MockPlatform, TimerSample};
    use quartz_hal::msr::addr;
    use quartz_hal::{CpuidResult, HalError, PciAddress};

    use super::*;
    use crate::ident::{CPU_VENDOR_AMD, CPU_VENDOR_INTEL};

    /// 4_000_000 ticks per 30 ms window
    const TSC_133: u64 = 133_333_333;

    fn base(vendor: u32, signature: u32) -> MockPlatform {
        MockPlatform::new()
            .with_cpuid(0, 0, CpuidResult::new(0xB, vendor, 0, 0))
            .with_cpuid(1, 0, CpuidResult::new(signature, 0, 0x0098_E3BD, 0xBFEB_FBFF))
            .with_cpuid(0x8000_0000, 0, CpuidResult::new(0x8000_0008, 0, 0, 0))
            .with_cpuid(0x8000_0001, 0, CpuidResult::new(0, 0, 0x0000_0001, 0x2810_0000))
            .with_samples(&[TimerSample::delta(4000, 4_000_000); 10])
    }

    /// Westmere-EP, an erratum part
    fn westmere(brand: &str) -> MockPlatform {
        base(CPU_VENDOR_INTEL, 0x0002_06C2)
            .with_brand_string(brand)
            .with_msr(addr::MSR_CORE_THREAD_COUNT, 0x0004_0004)
            .with_msr(addr::MSR_PLATFORM_INFO, 20 << 8)
            .with_msr(addr::MSR_FLEX_RATIO, 0)
    }

    fn quiet() -> ProbeConfig {
        ProbeConfig::new().with_trace(TraceFlags::empty())
    }

    #[test]
    fn test_westmere_base_clock() {
        let mut mock = westmere("Intel(R) Xeon(R) CPU X5647 @ 2.93GHz");
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.tsc_frequency, TSC_133);
        assert_eq!(info.current_ratio, Ratio::whole(20));
        assert_eq!(info.max_ratio, Ratio::default());
        assert_eq!(info.fsb_frequency, TSC_133 / 20);
        assert_eq!(info.cpu_frequency, TSC_133);
        assert_eq!((info.cores, info.threads), (4, 4));
        // Brand tiers decide the class on this path
        assert_eq!(info.cpu_type, CpuType::CoreI7);
        assert_eq!(info.qpi_speed, 0);
        assert!(!mock.gate_open());
    }

    #[test]
    fn test_core_i5_brand() {
        let mut mock = base(CPU_VENDOR_INTEL, 0x0002_0655)
            .with_brand_string("Intel(R) Core(TM) i5 CPU         650  @ 3.20GHz")
            .with_msr(addr::MSR_CORE_THREAD_COUNT, 0x0002_0004)
            .with_msr(addr::MSR_PLATFORM_INFO, 24 << 8)
            .with_msr(addr::MSR_FLEX_RATIO, 0);
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.cpu_type, CpuType::CoreI5);
        assert!(!info.mobile);
        assert_eq!(info.brand(), "Intel(R) Core(TM) i5 CPU         650  @ 3.20GHz");
        assert_eq!((info.cores, info.threads), (2, 4));
    }

    #[test]
    fn test_placeholder_brand() {
        let mut mock = westmere("Unknown CPU Typ");
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!(info.brand(), "");
        assert_eq!(info.cpu_type, CpuType::CoreI7);
    }

    #[test]
    fn test_erratum_bits_masked() {
        let mut mock = westmere("").with_msr(addr::MSR_CORE_THREAD_COUNT, 0xFFF6_000C);
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!((info.cores, info.threads), (6, 12));

        // Nehalem takes the full field
        let mut mock = mock.with_cpuid(1, 0, CpuidResult::new(0x0001_06A5, 0, 0, 0));
        mock.reset_timer();
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!(info.cores, 0xFFF6);
    }

    #[test]
    fn test_flex_ratio_clamp() {
        let mut mock = westmere("").with_msr(addr::MSR_FLEX_RATIO, (1 << 16) | (16 << 8));
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!(info.current_ratio, Ratio::whole(16));
        assert_eq!(info.fsb_frequency, TSC_133 / 16);

        // A higher flex ratio never raises the multiplier
        let mut mock = westmere("").with_msr(addr::MSR_FLEX_RATIO, (1 << 16) | (24 << 8));
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!(info.current_ratio, Ratio::whole(20));
    }

    #[test]
    fn test_qpi_speed_on_modern_path() {
        let uncore = PciAddress::new(0xFF, 3, 4);
        let link = PciAddress::new(0xFF, 2, 1);
        let mut mock = westmere("")
            .with_msr(addr::MSR_PLATFORM_INFO, 22 << 8)
            .with_config32(uncore, 0, 0x2C70_8086)
            .with_config32(link, 0x50, 0x0000_0018);
        let info = resolve(&mut mock, &quiet()).unwrap();

        // 24 * 2 * 6 MHz = 288, rounded
        assert_eq!(info.fsb_frequency, TSC_133 / 22);
        assert_eq!(info.qpi_speed, 300);
    }

    #[test]
    fn test_turbo_ratios_traced() {
        let mut mock = westmere("")
            .with_msr(addr::MSR_CORE_THREAD_COUNT, 0x0006_000C)
            .with_msr(addr::MSR_TURBO_RATIO_LIMIT, 0x1919_1A1A_1B1C);
        let config = quiet().with_trace(TraceFlags::TURBO_RATIOS);
        let info = resolve(&mut mock, &config).unwrap();
        let turbo = info.turbo.unwrap();
        assert_eq!(turbo.as_slice(), &[0x1C, 0x1B, 0x1A, 0x1A, 0x19, 0x19]);

        mock.reset_timer();
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!(info.turbo, None);
    }

    #[test]
    fn test_legacy_half_step() {
        // Core 2 Duo (Penryn), single core enabled, max 9.5, running at 8.5
        let status = (1u64 << 46) | (9 << 40) | (1 << 14) | (8 << 8);
        let mut mock = base(CPU_VENDOR_INTEL, 0x0001_0676)
            .with_cpuid(1, 0, CpuidResult::new(0x0001_0676, 1 << 16, 0, 0))
            .with_msr(addr::IA32_PERF_STATUS, status)
            .with_samples(&[TimerSample::delta(9000, 95_000_000); 10]);
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.tsc_frequency, 3_166_666_666);
        assert_eq!(info.max_ratio, Ratio::new(9, true));
        assert_eq!(info.current_ratio, Ratio::new(8, true));
        assert_eq!(info.fsb_frequency, 333_333_333);
        assert_eq!(info.cpu_frequency, 2_833_333_330);
        assert_eq!((info.cores, info.threads), (1, 1));
        assert_eq!(info.cpu_type, CpuType::CoreSolo);
    }

    #[test]
    fn test_legacy_quad_core_promotion() {
        // Core 2 Quad Q9450: leaf 4 reports 4 cores, max ratio 8
        let mut mock = base(CPU_VENDOR_INTEL, 0x0001_0677)
            .with_cpuid(1, 0, CpuidResult::new(0x0001_0677, 4 << 16, 0, 0))
            .with_cpuid(4, 0, CpuidResult::new(3 << 26, 0, 0, 0))
            .with_msr(addr::IA32_PERF_STATUS, (8 << 40) | (6 << 8))
            .with_samples(&[TimerSample::delta(9000, 80_000_000); 10]);
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.fsb_frequency, 333_333_333);
        assert_eq!(info.cpu_frequency, 1_999_999_998);
        assert_eq!((info.cores, info.threads), (4, 4));
        assert_eq!(info.cpu_type, CpuType::QuadCoreXeon);
    }

    #[test]
    fn test_legacy_without_max_ratio_field() {
        // Pentium M (Dothan): the current ratio stands in for the maximum
        let mut mock = base(CPU_VENDOR_INTEL, 0x0000_06D8)
            .with_msr(addr::IA32_PERF_STATUS, (12 << 40) | (10 << 8));
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.max_ratio, Ratio::whole(10));
        assert_eq!(info.fsb_frequency, TSC_133 / 10);
        assert_eq!(info.cpu_frequency, TSC_133 / 10 * 10);
        assert_eq!(info.cpu_type, CpuType::Core2);
    }

    #[test]
    fn test_pre_core_processor_defaults() {
        // Pentium III (Tualatin) predates the ratio registers
        let mut mock = base(CPU_VENDOR_INTEL, 0x0000_06B1)
            .with_msr(addr::IA32_PERF_STATUS, (12 << 40) | (10 << 8));
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.fsb_frequency, DEFAULT_FSB_FREQUENCY);
        assert_eq!(info.cpu_frequency, TSC_133);
        assert_eq!((info.cores, info.threads), (1, 1));
        assert_eq!(mock.msr_reads(), 0);
    }

    #[test]
    fn test_unknown_vendor_defaults() {
        let mut mock = base(CPU_VENDOR_AMD, 0x0010_0F42);
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.vendor(), CpuVendor::Amd);
        assert_eq!(info.fsb_frequency, DEFAULT_FSB_FREQUENCY);
        assert_eq!(info.cpu_frequency, info.tsc_frequency);
        assert_eq!((info.cores, info.threads), (1, 1));
        assert_eq!(info.cpu_type, CpuType::Core2);
        assert_eq!(mock.msr_reads(), 0);
    }

    #[test]
    fn test_zero_ratio_falls_back() {
        let mut mock = westmere("").with_msr(addr::MSR_PLATFORM_INFO, 0);
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!(info.fsb_frequency, DEFAULT_FSB_FREQUENCY);
        assert_eq!(info.cpu_frequency, TSC_133);
    }

    #[test]
    fn test_failed_calibration_falls_back() {
        let mut mock = westmere("").with_samples(&[]);
        let info = resolve(&mut mock, &quiet()).unwrap();
        assert_eq!(info.tsc_frequency, 0);
        assert_eq!(info.fsb_frequency, DEFAULT_FSB_FREQUENCY);
        assert_eq!(info.cpu_frequency, 0);
    }

    #[test]
    fn test_unreadable_msr_propagates() {
        let mut mock = base(CPU_VENDOR_INTEL, 0x0001_0676);
        assert_eq!(
            resolve(&mut mock, &quiet()),
            Err(HalError::MsrUnavailable(addr::IA32_PERF_STATUS))
        );
    }

    #[test]
    fn test_features_and_identity() {
        let mut mock = westmere("Intel(R) Xeon(R) CPU X5670 @ 2.93GHz");
        let info = resolve(&mut mock, &quiet()).unwrap();

        assert_eq!(info.features, 0x0098_E3BD | 0xBFEB_FBFF | 0x0000_0001 | 0x2810_0000);
        assert_eq!(info.id.model, 0x2C);
        assert_eq!(info.id.stepping, 2);
        assert_eq!(info.cpuid.max_extended_leaf(), 0x8000_0008);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut mock = westmere("Intel(R) Core(TM) i7 CPU X 980  @ 3.33GHz")
            .with_msr(addr::MSR_TURBO_RATIO_LIMIT, 0x1A1B);
        let config = ProbeConfig::new().with_trace(TraceFlags::all());

        let first = resolve(&mut mock, &config).unwrap();
        mock.reset_timer();
        let second = resolve(&mut mock, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dump_format() {
        let mut mock = westmere("Intel(R) Xeon(R) CPU X5647 @ 2.93GHz");
        let dump = resolve(&mut mock, &quiet()).unwrap().to_string();

        assert!(dump.starts_with("CPU: Brandstring          : Intel(R) Xeon(R) CPU X5647 @ 2.93GHz\n"));
        assert!(dump.contains("CPU: Type                 : 0x701\n"));
        assert!(dump.contains("CPU: NumCores/NumThreads  : 4/4\n"));
        assert!(dump.contains("CPU: MaxCoef/CurrCoef     : 0/20\n"));
        assert!(dump.contains("CPU: FSBFreq              : 6MHz\n"));
        assert!(dump.ends_with("CPU: QPISpeed             : 0"));
    }
}
