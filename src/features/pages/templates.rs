use std::path::Path;

use minijinja::{Environment, context};

use crate::error::AppError;

/// 页面模板渲染器（从模板目录按需加载 `*.html`，自动转义）
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new(templates_dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(templates_dir.to_path_buf()));
        Self { env }
    }

    /// 渲染指定页面
    pub fn render(&self, template_name: &str) -> Result<String, AppError> {
        let tpl = self.env.get_template(template_name)?;
        let html = tpl.render(context! {
            service => crate::features::health::handler::SERVICE_NAME,
            version => env!("CARGO_PKG_VERSION"),
        })?;
        Ok(html)
    }
}
