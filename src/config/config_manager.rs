// ==========================================
// 订单模板批量生成工具 - 配置管理器
// ==========================================
// 职责: 配置文件定位、加载、环境变量覆写、校验
// 存储: TOML 文件（可缺省，缺省即全部默认值）
// 定位顺序: 显式路径 → ORDER_BATCHER_CONFIG → 用户配置目录 → 内置默认
// ==========================================

use crate::config::batch_config::BatchConfig;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::warehouse_tables::WarehouseTables;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 配置键 / 环境变量名
pub mod config_keys {
    pub const ENV_CONFIG_PATH: &str = "ORDER_BATCHER_CONFIG";
    pub const ENV_CHUNK_SIZE: &str = "ORDER_BATCHER_CHUNK_SIZE";
    pub const ENV_OUTPUT_PREFIX: &str = "ORDER_BATCHER_OUTPUT_PREFIX";

    pub const APP_DIR: &str = "order-batcher";
    pub const CONFIG_FILE: &str = "config.toml";

    pub const CHUNK_SIZE: &str = "chunk_size";
    pub const HEADER_ROW: &str = "header_row";
    pub const START_ROW: &str = "start_row";
    pub const OUTPUT_PREFIX: &str = "output_prefix";
    pub const CONSOLIDATION_CAP: &str = "consolidation.cap";
    pub const PHONE_LENGTH: &str = "cleaning.phone_length";
    pub const INDICATIVO_COLUMN: &str = "indicativo.preferred_column";
    pub const WAREHOUSE_DESTINATIONS: &str = "warehouse_destinations";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: BatchConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 按定位顺序加载配置，并应用环境变量覆写
    ///
    /// # 参数
    /// - explicit: 命令行指定的配置文件（必须存在）
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// 同 load，环境变量读取可注入（测试用）
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = Self::resolve_path(explicit, &env);

        let mut config = match &source {
            Some(path) => Self::read_file(path)?,
            None => {
                debug!("未找到配置文件，使用内置默认配置");
                BatchConfig::default()
            }
        };

        Self::apply_env_overrides(&mut config, &env)?;
        Self::validate(&config)?;

        info!(
            source = %source.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<defaults>".to_string()),
            chunk_size = config.chunk_size,
            consolidation = %config.consolidation.mode,
            "配置加载完成"
        );
        Ok(Self { config, source })
    }

    /// 直接使用给定配置（校验后）
    pub fn from_config(config: BatchConfig) -> ConfigResult<Self> {
        Self::validate(&config)?;
        Ok(Self {
            config,
            source: None,
        })
    }

    /// 定位配置文件
    ///
    /// 显式路径与环境变量路径不检查存在性（读取时报错）；
    /// 用户配置目录下的文件仅在存在时使用
    pub fn resolve_path<F>(explicit: Option<&Path>, env: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(raw) = env(config_keys::ENV_CONFIG_PATH) {
            let raw = raw.trim();
            if !raw.is_empty() {
                return Some(PathBuf::from(raw));
            }
        }
        dirs::config_dir()
            .map(|dir| dir.join(config_keys::APP_DIR).join(config_keys::CONFIG_FILE))
            .filter(|p| p.is_file())
    }

    pub fn read_file(path: &Path) -> ConfigResult<BatchConfig> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_str(&raw, &path.display().to_string())
    }

    pub fn parse_str(raw: &str, origin: &str) -> ConfigResult<BatchConfig> {
        toml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// 环境变量覆写（数值格式错误直接报错，不静默回退）
    pub fn apply_env_overrides<F>(config: &mut BatchConfig, env: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = env(config_keys::ENV_CHUNK_SIZE) {
            config.chunk_size = raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::invalid(config_keys::ENV_CHUNK_SIZE, &raw, e.to_string())
            })?;
        }
        if let Some(raw) = env(config_keys::ENV_OUTPUT_PREFIX) {
            config.output_prefix = raw.trim().to_string();
        }
        Ok(())
    }

    /// 配置校验
    pub fn validate(config: &BatchConfig) -> ConfigResult<()> {
        if config.chunk_size == 0 {
            return Err(ConfigError::invalid(config_keys::CHUNK_SIZE, 0, "必须大于 0"));
        }
        if config.header_row == 0 {
            return Err(ConfigError::invalid(config_keys::HEADER_ROW, 0, "行号从 1 开始"));
        }
        if config.start_row == 0 {
            return Err(ConfigError::invalid(config_keys::START_ROW, 0, "行号从 1 开始"));
        }
        if config.output_prefix.trim().is_empty() {
            return Err(ConfigError::invalid(config_keys::OUTPUT_PREFIX, "", "不能为空"));
        }
        let cap = config.consolidation.cap;
        if !cap.is_finite() || cap <= 0.0 {
            return Err(ConfigError::invalid(config_keys::CONSOLIDATION_CAP, cap, "必须为正数"));
        }
        if config.cleaning.phone_length < config.cleaning.phone_prefix.len() {
            return Err(ConfigError::invalid(
                config_keys::PHONE_LENGTH,
                config.cleaning.phone_length,
                "不能短于电话前缀",
            ));
        }
        if config.indicativo.preferred_column == 0 {
            return Err(ConfigError::invalid(config_keys::INDICATIVO_COLUMN, 0, "列号从 1 开始"));
        }
        if config.warehouse_destinations.is_empty() {
            return Err(ConfigError::invalid(
                config_keys::WAREHOUSE_DESTINATIONS,
                "[]",
                "至少需要一个仓库目标列",
            ));
        }

        if config.start_row <= config.header_row {
            warn!(
                header_row = config.header_row,
                start_row = config.start_row,
                "数据起始行不在表头之后，表头可能被覆盖"
            );
        }
        Ok(())
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BatchConfig {
        &mut self.config
    }

    pub fn into_config(self) -> BatchConfig {
        self.config
    }

    /// 实际读取的配置文件（None → 默认配置）
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 仓库查表数据：配置了外部文件则加载之，否则内置
    pub fn warehouse_tables(&self) -> ConfigResult<WarehouseTables> {
        match &self.config.warehouse_tables {
            Some(path) => WarehouseTables::load(path),
            None => WarehouseTables::builtin(),
        }
    }
}
