use serde::{Deserialize, Serialize};

/// 渲染后页面的快照
///
/// 由页面内的一次脚本执行生成，只包含可序列化的数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomSnapshot {
    pub url: String,
    pub title: String,
    /// document.documentElement.outerHTML
    pub html: String,
}

/// 页面结构样本，用于失败后反馈给 LLM 重新生成选择器
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageStructuralSample {
    pub title: String,
    pub url: String,
    #[serde(rename = "bodyClasses")]
    pub body_classes: String,
    pub structure: Vec<StructureEntry>,
}

/// 某个结构探测选择器的匹配情况
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureEntry {
    pub selector: String,
    pub count: usize,
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(rename = "innerHTML")]
    pub inner_html: String,
}

impl PageStructuralSample {
    /// 序列化为带缩进的 JSON，嵌入到提示词中
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
