mod auth_flow_tests;
mod dashboard_tests;
mod herramientas_tests;
mod materiales_tests;
mod prestamos_tests;
