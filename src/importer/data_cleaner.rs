// ==========================================
// 订单模板批量生成工具 - 数据清洗器实现
// ==========================================
// 阶段 2: 整表清洗（就地修改）
// 职责: 空电话补全 / 邮箱域名过滤
// 规则:
// - 电话: TRIM 后为空 → 前缀 "3" + 随机数字补足 10 位；各行独立生成，不去重
// - 邮箱: TRIM + 小写；不以允许域名结尾 → 置空串
// - 源表缺列 → 跳过该规则并记录
// ==========================================

use crate::config::BatchConfig;
use crate::domain::{CellValue, CleaningReport, SourceRow, SourceTable};
use crate::importer::importer_trait::RowCleaner;
use rand::{Rng, RngCore};
use tracing::{info, warn};

// ==========================================
// PhoneFiller - 空电话补全
// ==========================================
pub struct PhoneFiller {
    column: String,
    prefix: String,
    length: usize,
}

impl PhoneFiller {
    pub fn new(column: impl Into<String>, prefix: impl Into<String>, length: usize) -> Self {
        Self {
            column: column.into(),
            prefix: prefix.into(),
            length,
        }
    }

    /// 生成一个合成号码：前缀 + 随机数字
    pub fn generate(&self, rng: &mut dyn RngCore) -> String {
        let mut phone = String::with_capacity(self.length);
        phone.push_str(&self.prefix);
        while phone.len() < self.length {
            let digit: u8 = rng.random_range(0..10);
            phone.push(char::from(b'0' + digit));
        }
        phone
    }
}

impl RowCleaner for PhoneFiller {
    fn name(&self) -> &'static str {
        "phone_fill"
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn clean_row(&self, row: &mut SourceRow, rng: &mut dyn RngCore) -> bool {
        let blank = row.get(&self.column).map_or(true, CellValue::is_blank);
        if !blank {
            return false;
        }
        let phone = self.generate(rng);
        row.set(self.column.clone(), CellValue::Text(phone));
        true
    }
}

// ==========================================
// EmailFilter - 邮箱域名白名单
// ==========================================
pub struct EmailFilter {
    column: String,
    suffixes: Vec<String>, // 形如 "@gmail.com"
}

impl EmailFilter {
    pub fn new<I, S>(column: impl Into<String>, allowed_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = allowed_domains
            .into_iter()
            .map(|d| format!("@{}", d.as_ref().trim().trim_start_matches('@').to_lowercase()))
            .collect();
        Self {
            column: column.into(),
            suffixes,
        }
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        self.suffixes.iter().any(|s| email.ends_with(s.as_str()))
    }
}

impl RowCleaner for EmailFilter {
    fn name(&self) -> &'static str {
        "email_filter"
    }

    fn column(&self) -> &str {
        &self.column
    }

    fn clean_row(&self, row: &mut SourceRow, _rng: &mut dyn RngCore) -> bool {
        let Some(value) = row.get(&self.column) else {
            return false;
        };
        if value.is_blank() {
            return false;
        }

        let email = value.as_text().trim().to_lowercase();
        if self.is_allowed(&email) {
            row.set(self.column.clone(), CellValue::Text(email));
            false
        } else {
            row.set(self.column.clone(), CellValue::Text(String::new()));
            true
        }
    }
}

// ==========================================
// DataCleaner - 整表清洗
// ==========================================
pub struct DataCleaner {
    phone: Option<PhoneFiller>,
    email: Option<EmailFilter>,
}

impl DataCleaner {
    pub fn new(phone: Option<PhoneFiller>, email: Option<EmailFilter>) -> Self {
        Self { phone, email }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        if !config.cleaning.enabled {
            return Self::new(None, None);
        }
        let phone = PhoneFiller::new(
            config.columns.phone.clone(),
            config.cleaning.phone_prefix.clone(),
            config.cleaning.phone_length,
        );
        let email = EmailFilter::new(
            config.columns.email.clone(),
            &config.cleaning.allowed_email_domains,
        );
        Self::new(Some(phone), Some(email))
    }

    pub fn clean_table<R: RngCore>(&self, table: &mut SourceTable, rng: &mut R) -> CleaningReport {
        let mut report = CleaningReport::default();

        if let Some(phone) = &self.phone {
            match apply(phone, table, &mut *rng) {
                Some(n) => report.phone_filled = n,
                None => report.skipped_columns.push(phone.column().to_string()),
            }
        }
        if let Some(email) = &self.email {
            match apply(email, table, &mut *rng) {
                Some(n) => report.email_cleared = n,
                None => report.skipped_columns.push(email.column().to_string()),
            }
        }

        info!(
            phone_filled = report.phone_filled,
            email_cleared = report.email_cleared,
            "数据清洗完成"
        );
        report
    }
}

/// 对整表执行单条规则；列缺失返回 None
fn apply(cleaner: &dyn RowCleaner, table: &mut SourceTable, rng: &mut dyn RngCore) -> Option<usize> {
    if !table.has_column(cleaner.column()) {
        warn!(rule = cleaner.name(), column = cleaner.column(), "源表缺少列，跳过清洗规则");
        return None;
    }
    let mut changed = 0;
    for row in table.rows.iter_mut() {
        if cleaner.clean_row(row, rng) {
            changed += 1;
        }
    }
    Some(changed)
}
