pub mod block_html;
pub mod dom_indices;
