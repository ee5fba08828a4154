use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub node_border: String,
    pub male_fill: String,
    pub female_fill: String,
    pub other_fill: String,
    pub deceased_ribbon: String,
    pub avatar_fill: String,
    pub parent_edge_color: String,
    pub union_ongoing_color: String,
    pub union_inactive_color: String,
    pub edge_label_color: String,
    pub minimap_male: String,
    pub minimap_other: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "system-ui, -apple-system, \"Segoe UI\", Roboto, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1F2937".to_string(),
            muted_text_color: "#6B7280".to_string(),
            node_border: "#D1D5DB".to_string(),
            male_fill: "#DBEAFE".to_string(),
            female_fill: "#FCE7F3".to_string(),
            other_fill: "#F3F4F6".to_string(),
            deceased_ribbon: "#374151".to_string(),
            avatar_fill: "#E5E7EB".to_string(),
            parent_edge_color: "#9CA3AF".to_string(),
            union_ongoing_color: "#6366F1".to_string(),
            union_inactive_color: "#9CA3AF".to_string(),
            edge_label_color: "#6B7280".to_string(),
            minimap_male: "#DBEAFE".to_string(),
            minimap_other: "#FCE7F3".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#F8FAFC".to_string(),
            text_color: "#0F172A".to_string(),
            muted_text_color: "#64748B".to_string(),
            node_border: "#CBD5E1".to_string(),
            male_fill: "#E0F2FE".to_string(),
            female_fill: "#FFE4E6".to_string(),
            other_fill: "#F1F5F9".to_string(),
            deceased_ribbon: "#1E293B".to_string(),
            avatar_fill: "#E2E8F0".to_string(),
            parent_edge_color: "#94A3B8".to_string(),
            union_ongoing_color: "#4F46E5".to_string(),
            union_inactive_color: "#94A3B8".to_string(),
            edge_label_color: "#64748B".to_string(),
            minimap_male: "#E0F2FE".to_string(),
            minimap_other: "#FFE4E6".to_string(),
        }
    }
}
