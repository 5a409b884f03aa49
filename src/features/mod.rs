/// 健康检查
pub mod health;
/// 页面渲染（首页 / 结果页 / 错误页）
pub mod pages;
/// 上传提交与状态转发
pub mod prediction;
