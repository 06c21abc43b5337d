//! Generated project documents for the two-layer docs layout.

use super::layout::ManagedFiles;

const CUSTOMIZATION_MARK: &str = "📝 **项目定制文档**";

pub fn has_customization_header(content: &str) -> bool {
    content.contains(CUSTOMIZATION_MARK)
}

/// Prefix an override with the project-customisation banner, once.
pub fn add_customization_header(content: &str, upstream_version: &str, file: &str) -> String {
    if has_customization_header(content) {
        return content.to_string();
    }
    format!(
        "> {CUSTOMIZATION_MARK}\n\
         >\n\
         > 本文档基于上游工作流 v{upstream_version}，已针对本项目定制。\n\
         >\n\
         > - 执行 `mcflow conflicts` 可查看上游更新\n\
         > - 上游文档位于: `{}/{file}`\n\n\
         ---\n\n\
         {content}",
        ManagedFiles::CORE_DOCS_DIR
    )
}

/// `markdown/README.md`: where each layer of documentation lives.
pub fn docs_readme(files: &ManagedFiles, version: &str, date: &str) -> String {
    let mut core = String::new();
    for doc in files.core_docs() {
        core.push_str(&format!(
            "- [{doc}](../{}/{doc})\n",
            ManagedFiles::CORE_DOCS_DIR
        ));
    }
    for dir in files.core_dirs() {
        core.push_str(&format!(
            "- [{dir}/](../{}/{dir}/)\n",
            ManagedFiles::CORE_DOCS_DIR
        ));
    }

    format!(
        "# 项目文档导航\n\n\
         > 📚 本项目使用 MODSDK 开发工作流 v{version}\n\n\
         ---\n\n\
         ## 📂 文档组织结构\n\n\
         ### 核心工作流文档（上游提供）\n\n\
         存储位置：`.claude/core-docs/`\n\n\
         这些文档由工作流上游维护，默认只读：\n\
         {core}\n\
         **💡 如何定制核心文档？**\n\n\
         1. 将文档复制到 `markdown/core/`\n\
         2. 编辑 `markdown/core/[文档名].md`\n\
         3. AI会自动优先读取项目定制版本\n\n\
         ---\n\n\
         ### 项目特定文档（本地维护）\n\n\
         - [systems/](./systems/) - 本项目的System实现文档\n\
         - [core/](./core/) - 覆盖上游核心文档的项目定制版本\n\n\
         ---\n\n\
         ## 📖 查阅优先级\n\n\
         1. `markdown/core/` (项目定制版)\n\
         2. `.claude/core-docs/` (上游基线)\n\
         3. `markdown/systems/` (项目System文档)\n\n\
         ---\n\n\
         _文档版本: v{version} | 更新时间: {date}_\n"
    )
}
