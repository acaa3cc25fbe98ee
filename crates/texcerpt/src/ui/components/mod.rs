pub mod diagnostics;
pub mod path_prompt;
pub mod section_list;
pub mod section_preview;
