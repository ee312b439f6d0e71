/// 字段类别
///
/// 根据字段名（不区分大小写的子串匹配）决定字段的兜底选择器集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldFamily {
    /// 名称 / 标题
    Name,
    /// 价格
    Price,
    /// 评分 / 星级
    Rating,
}

const NAME_FALLBACKS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    ".title",
    ".name",
    ".product-title",
    ".product-name",
    "[class*=\"title\"]",
    "[class*=\"name\"]",
    "[class*=\"product\"]",
    "a[href*=\"product\"]",
    "a[href*=\"item\"]",
    ".card-title",
    ".item-title",
    ".heading",
    "span[class*=\"title\"]",
    "div[class*=\"title\"]",
];

const PRICE_FALLBACKS: &[&str] = &[
    ".price",
    ".cost",
    ".amount",
    ".money",
    ".currency",
    "[class*=\"price\"]",
    "[class*=\"cost\"]",
    "[class*=\"money\"]",
    ".product-price",
    ".item-price",
    ".sale-price",
    "[data-price]",
    "span[class*=\"price\"]",
    "div[class*=\"price\"]",
    ".price-current",
    ".price-new",
];

const RATING_FALLBACKS: &[&str] = &[
    ".rating",
    ".stars",
    ".score",
    ".review",
    "[class*=\"rating\"]",
    "[class*=\"star\"]",
    "[class*=\"review\"]",
    ".product-rating",
    ".item-rating",
    ".star-rating",
    "[data-rating]",
    "[aria-label*=\"star\"]",
    "span[class*=\"rating\"]",
    "div[class*=\"star\"]",
];

impl FieldFamily {
    /// 从字段名识别类别
    ///
    /// 按 名称 → 价格 → 评分 的顺序检查，第一个命中的类别生效
    pub fn find(field_name: &str) -> Option<Self> {
        let lower = field_name.to_lowercase();
        if lower.contains("name") || lower.contains("title") {
            return Some(FieldFamily::Name);
        }
        if lower.contains("price") {
            return Some(FieldFamily::Price);
        }
        if lower.contains("rating") || lower.contains("star") {
            return Some(FieldFamily::Rating);
        }
        None
    }

    /// 该类别的兜底选择器（按优先级排列）
    pub fn fallback_selectors(self) -> &'static [&'static str] {
        match self {
            FieldFamily::Name => NAME_FALLBACKS,
            FieldFamily::Price => PRICE_FALLBACKS,
            FieldFamily::Rating => RATING_FALLBACKS,
        }
    }

    /// 字段名对应的兜底选择器，未识别的字段没有兜底
    pub fn fallbacks_for(field_name: &str) -> &'static [&'static str] {
        Self::find(field_name)
            .map(Self::fallback_selectors)
            .unwrap_or(&[])
    }
}
