pub mod health_handler;
pub mod quiz_handler;

use actix_web::web;

pub use health_handler::{health_check, health_check_ready};
pub use quiz_handler::{
    advance_session, answer_question, create_session, delete_session, get_session,
    list_my_results, reload_session,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(create_session)
        .service(get_session)
        .service(reload_session)
        .service(answer_question)
        .service(advance_session)
        .service(delete_session)
        .service(list_my_results);
}
