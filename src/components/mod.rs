pub mod review_form;
pub mod review_section;
pub mod reviews_list;
