//! Host CPU Detection
//!
//! 检测宿主 CPU 的厂商、型号和向量扩展，决定哪些测量区域可以运行

use std::fmt;
use std::sync::OnceLock;

/// 与测量区域相关的向量扩展
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VectorFeatures {
    pub sse2: bool,
    pub avx: bool,
    pub avx2: bool,
    pub avx512f: bool,
    pub neon: bool, // ARM NEON
}

/// 宿主 CPU 信息
#[derive(Debug, Clone)]
pub struct HostCpu {
    pub arch: &'static str,
    pub vendor: String,
    pub model_name: String,
    pub features: VectorFeatures,
}

static HOST_CPU: OnceLock<HostCpu> = OnceLock::new();

impl HostCpu {
    /// 获取全局宿主 CPU 信息（单例）
    pub fn get() -> &'static HostCpu {
        HOST_CPU.get_or_init(Self::detect)
    }

    fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self::detect_x86_64()
        }

        #[cfg(target_arch = "aarch64")]
        {
            Self::detect_aarch64()
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self {
                arch: std::env::consts::ARCH,
                vendor: String::from("Unknown"),
                model_name: format!("Unknown {} CPU", std::env::consts::ARCH),
                features: VectorFeatures::default(),
            }
        }
    }

    /// 检测 x86_64 CPU 信息
    #[cfg(target_arch = "x86_64")]
    fn detect_x86_64() -> Self {
        use raw_cpuid::CpuId;

        let cpuid = CpuId::new();
        let vendor = cpuid
            .get_vendor_info()
            .map(|info| info.as_str().to_string())
            .unwrap_or_else(|| String::from("Unknown"));
        let model_name = cpuid
            .get_processor_brand_string()
            .map(|brand| brand.as_str().trim().to_string())
            .unwrap_or_else(|| String::from("Unknown x86_64 CPU"));

        // 特性门控使用标准库检测，它同时检查操作系统是否保存了扩展寄存器状态
        let features = VectorFeatures {
            sse2: std::arch::is_x86_feature_detected!("sse2"),
            avx: std::arch::is_x86_feature_detected!("avx"),
            avx2: std::arch::is_x86_feature_detected!("avx2"),
            avx512f: std::arch::is_x86_feature_detected!("avx512f"),
            neon: false,
        };

        Self {
            arch: "x86_64",
            vendor,
            model_name,
            features,
        }
    }

    /// 检测 aarch64 CPU 信息
    #[cfg(target_arch = "aarch64")]
    fn detect_aarch64() -> Self {
        Self {
            arch: "aarch64",
            vendor: String::from("ARM"),
            model_name: String::from("Unknown aarch64 CPU"),
            features: VectorFeatures {
                neon: std::arch::is_aarch64_feature_detected!("neon"),
                ..VectorFeatures::default()
            },
        }
    }

    /// 是否支持给定位宽的整数向量加法
    pub fn supports_vector_width(&self, width: u32) -> bool {
        match (self.arch, width) {
            ("x86_64", 128) => self.features.sse2,
            ("x86_64", 256) => self.features.avx2,
            ("x86_64", 512) => self.features.avx512f,
            ("aarch64", 128) => self.features.neon,
            _ => false,
        }
    }
}

impl fmt::Display for HostCpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let features = &self.features;
        write!(
            f,
            "{} {} ({}) sse2={} avx={} avx2={} avx512f={} neon={}",
            self.arch,
            self.vendor,
            self.model_name,
            features.sse2,
            features.avx,
            features.avx2,
            features.avx512f,
            features.neon
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_is_cached() {
        let a = HostCpu::get() as *const HostCpu;
        let b = HostCpu::get() as *const HostCpu;
        assert_eq!(a, b);
    }

    #[test]
    fn odd_widths_are_unsupported() {
        let cpu = HostCpu::get();
        assert!(!cpu.supports_vector_width(0));
        assert!(!cpu.supports_vector_width(100));
        assert!(!cpu.supports_vector_width(1024));
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn x86_64_always_has_sse2() {
        assert!(HostCpu::get().supports_vector_width(128));
    }
}
